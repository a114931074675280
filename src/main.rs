//! Heatkeeper firmware — entry point and scheduler loop.
//!
//! Startup order mirrors the device lifecycle: logger, panel, temperature
//! probes, Wi-Fi, relay discovery, status server, then the unbounded
//! control loop. The first three failures an operator can diagnose from
//! the panel; past that point the buzzer cadence is the diagnostic
//! (slow beep = could not start, fast beep = died while running).

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("heatkeeper targets ESP-IDF; build with --target and --features espidf");
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use anyhow::Result;
    use log::{error, info};

    use esp_idf_hal::gpio::IOPin as _;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::ledc::config::TimerConfig;
    use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::FromValueType as _;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use heatkeeper::adapters::buzzer::{self, LedcBuzzer};
    use heatkeeper::adapters::display::OledDisplay;
    use heatkeeper::adapters::ds18b20::Ds18b20Bank;
    use heatkeeper::adapters::http_server;
    use heatkeeper::adapters::log_sink::LogEventSink;
    use heatkeeper::adapters::shelly::ShellyTransport;
    use heatkeeper::adapters::time::Uptime;
    use heatkeeper::adapters::wifi;
    use heatkeeper::app::ports::DisplayPort;
    use heatkeeper::app::service::ThermostatService;
    use heatkeeper::config::{SystemConfig, CHANNEL_COUNT, RELAY_NAMES};
    use heatkeeper::control::Channel;
    use heatkeeper::relay::Relay;

    /// Scheduler granularity. Must divide the alarm half-period finely
    /// enough that the square wave stays audibly even.
    const TICK_SLEEP_MS: u64 = 50;

    pub fn run() -> Result<()> {
        // ── 1. ESP-IDF bootstrap ──────────────────────────────────
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;

        info!("heatkeeper v{}", env!("CARGO_PKG_VERSION"));

        let config = SystemConfig::from_env();
        config.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        // ── 2. Panel and buzzer first: everything after needs them
        //       to report failure ──────────────────────────────────
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio21,
            peripherals.pins.gpio22,
            &I2cConfig::new().baudrate(400u32.kHz().into()),
        )?;
        let mut display = OledDisplay::new(i2c).map_err(|e| anyhow::anyhow!("{e}"))?;

        let ledc_timer = LedcTimerDriver::new(
            peripherals.ledc.timer0,
            &TimerConfig::default().frequency(880u32.Hz()),
        )?;
        let ledc_channel = LedcDriver::new(
            peripherals.ledc.channel0,
            &ledc_timer,
            peripherals.pins.gpio25,
        )?;
        let mut tone = LedcBuzzer::new(ledc_timer, ledc_channel);

        // ── 3. Temperature probes ─────────────────────────────────
        display.show_message("Searching for", "temperature sensors");
        let mut sensors = match Ds18b20Bank::new(peripherals.pins.gpio4.downgrade()) {
            Ok(bank) => bank,
            Err(e) => {
                error!("sensor init failed: {e}");
                display.show_message("Sensor bus failed", "check wiring");
                buzzer::halt_hang(&mut tone);
            }
        };

        // ── 4. Wi-Fi ──────────────────────────────────────────────
        display.show_message("Connecting to wifi:", &config.wifi_ssid);
        let _wifi = match wifi::connect(peripherals.modem, sysloop, nvs, &config) {
            Ok(w) => w,
            Err(e) => {
                error!("wifi failed: {e}");
                display.show_message("Wifi failed:", &config.wifi_ssid);
                buzzer::halt_hang(&mut tone);
            }
        };

        // ── 5. Relay discovery ────────────────────────────────────
        let mut transport = ShellyTransport::new(config.relay_timeout_ms);
        let mut sink = LogEventSink;
        let channels: [Channel; CHANNEL_COUNT] = core::array::from_fn(|i| {
            Channel::new(i, Relay::new(RELAY_NAMES[i], config.relay_addrs[i].clone()))
        });
        let mut service = ThermostatService::new(config, channels);
        if let Err(e) = service.discover(&mut transport, &mut display, &mut sink) {
            error!("discovery failed: {e}");
            display.show_message("No relays found", "check plug power");
            buzzer::halt_hang(&mut tone);
        }

        // ── 6. Status server ──────────────────────────────────────
        let snapshot = Arc::new(Mutex::new(service.snapshot().clone()));
        let _server = match http_server::start(snapshot.clone()) {
            Ok(s) => s,
            Err(e) => {
                error!("http server failed: {e}");
                display.show_message("Web server failed", "");
                buzzer::halt_panic(&mut tone);
            }
        };

        info!("startup complete, entering control loop");

        // ── 7. Control loop ───────────────────────────────────────
        let clock = Uptime::new();
        loop {
            let polled = service.tick(
                clock.now_ms(),
                &mut sensors,
                &mut transport,
                &mut display,
                &mut tone,
                &mut sink,
            );
            if polled {
                match snapshot.lock() {
                    Ok(mut shared) => *shared = service.snapshot().clone(),
                    Err(_) => {
                        // A handler panicked while holding the lock. The
                        // control loop is the only writer, so keep running
                        // without the web view rather than dying with it.
                        error!("status snapshot poisoned");
                    }
                }
            }
            thread::sleep(Duration::from_millis(TICK_SLEEP_MS));
        }
    }
}
