//! DS18B20 temperature probe bank on a shared OneWire bus.
//!
//! Both probes hang off a single data line. At startup the bus is
//! enumerated and the discovered ROM addresses are sorted ascending, so
//! channel 0 is always the probe with the lower address; physical wiring
//! order does not matter as long as the probes are labelled once.

#[cfg(target_os = "espidf")]
mod hw {
    use ds18b20::{Ds18b20, Resolution};
    use esp_idf_hal::delay::Delay;
    use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver};
    use one_wire_bus::{OneWire, OneWireError};

    use crate::app::ports::TemperaturePort;
    use crate::config::CHANNEL_COUNT;
    use crate::error::{Error, Result, SensorError};

    type Bus = OneWire<PinDriver<'static, AnyIOPin, InputOutput>>;

    fn bus_err<E>(err: OneWireError<E>) -> SensorError {
        match err {
            OneWireError::CrcMismatch => SensorError::CrcMismatch,
            _ => SensorError::BusError,
        }
    }

    pub struct Ds18b20Bank {
        bus: Bus,
        delay: Delay,
        probes: [Option<Ds18b20>; CHANNEL_COUNT],
        latest: [Option<f32>; CHANNEL_COUNT],
    }

    impl Ds18b20Bank {
        pub fn new(pin: AnyIOPin) -> Result<Self> {
            let driver = PinDriver::input_output_od(pin).map_err(|_| Error::Init("onewire pin"))?;
            let mut bus = OneWire::new(driver).map_err(|_| SensorError::BusError)?;
            let mut delay = Delay::new_default();

            let mut addresses: heapless::Vec<one_wire_bus::Address, 8> = heapless::Vec::new();
            for device in bus.devices(false, &mut delay) {
                let address = device.map_err(bus_err)?;
                if address.family_code() == ds18b20::FAMILY_CODE {
                    let _ = addresses.push(address);
                }
            }
            if addresses.is_empty() {
                return Err(SensorError::NotFound.into());
            }
            addresses.sort_unstable_by_key(|a| a.0);

            let mut probes: [Option<Ds18b20>; CHANNEL_COUNT] = [None, None];
            for (slot, address) in probes.iter_mut().zip(addresses.iter()) {
                *slot = Some(Ds18b20::new::<core::convert::Infallible>(*address).map_err(bus_err)?);
            }
            log::info!("found {} temperature probe(s)", addresses.len().min(CHANNEL_COUNT));

            Ok(Self {
                bus,
                delay,
                probes,
                latest: [None; CHANNEL_COUNT],
            })
        }

        /// One conversion covers every probe on the bus.
        fn convert_all(&mut self) {
            if ds18b20::start_simultaneous_temp_measurement(&mut self.bus, &mut self.delay).is_err()
            {
                self.latest = [None; CHANNEL_COUNT];
                return;
            }
            Resolution::Bits12.delay_for_measurement_time(&mut self.delay);
            for (slot, probe) in self.latest.iter_mut().zip(self.probes.iter()) {
                *slot = probe.as_ref().and_then(|p| {
                    p.read_data(&mut self.bus, &mut self.delay)
                        .ok()
                        .map(|data| data.temperature)
                });
            }
        }
    }

    impl TemperaturePort for Ds18b20Bank {
        fn read(&mut self, channel: usize) -> Option<f32> {
            // The service reads channel 0 first every cycle; kick off a
            // fresh conversion there and serve channel 1 from the same one.
            if channel == 0 {
                self.convert_all();
            }
            self.latest.get(channel).copied().flatten()
        }
    }
}

#[cfg(target_os = "espidf")]
pub use hw::Ds18b20Bank;

/// Host stand-in with settable readings.
#[cfg(not(target_os = "espidf"))]
pub struct SimSensors {
    readings: [Option<f32>; crate::config::CHANNEL_COUNT],
}

#[cfg(not(target_os = "espidf"))]
impl SimSensors {
    pub fn new() -> Self {
        Self {
            readings: [None; crate::config::CHANNEL_COUNT],
        }
    }

    pub fn set(&mut self, channel: usize, reading: Option<f32>) {
        if let Some(slot) = self.readings.get_mut(channel) {
            *slot = reading;
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl crate::app::ports::TemperaturePort for SimSensors {
    fn read(&mut self, channel: usize) -> Option<f32> {
        self.readings.get(channel).copied().flatten()
    }
}
