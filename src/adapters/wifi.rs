//! Station-mode Wi-Fi bring-up.
//!
//! Connection is a hard startup requirement: the relays and the status page
//! both live on the LAN, so a failure here is fatal and the caller parks the
//! board in a beep loop.

#[cfg(target_os = "espidf")]
mod hw {
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};

    use crate::config::SystemConfig;
    use crate::error::{Error, Result};

    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &SystemConfig,
    ) -> Result<BlockingWifi<EspWifi<'static>>> {
        let esp_wifi =
            EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(|_| Error::Init("wifi driver"))?;
        let mut wifi =
            BlockingWifi::wrap(esp_wifi, sysloop).map_err(|_| Error::Init("wifi wrap"))?;

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config
                .wifi_ssid
                .as_str()
                .try_into()
                .map_err(|_| Error::Config("ssid too long"))?,
            password: config
                .wifi_password
                .as_str()
                .try_into()
                .map_err(|_| Error::Config("password too long"))?,
            ..Default::default()
        }))
        .map_err(|_| Error::Init("wifi configuration"))?;

        wifi.start().map_err(|_| Error::Init("wifi start"))?;
        wifi.connect().map_err(|_| Error::Init("wifi connect"))?;
        wifi.wait_netif_up().map_err(|_| Error::Init("wifi netif"))?;

        // Modem sleep adds hundreds of ms of jitter to every relay call.
        unsafe {
            esp_idf_sys::esp_wifi_set_ps(esp_idf_sys::wifi_ps_type_t_WIFI_PS_NONE);
        }

        if let Ok(ip_info) = wifi.wifi().sta_netif().get_ip_info() {
            log::info!("wifi up, ip {}", ip_info.ip);
        }
        Ok(wifi)
    }
}

#[cfg(target_os = "espidf")]
pub use hw::connect;
