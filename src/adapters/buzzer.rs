//! Piezo buzzer on an LEDC PWM channel.
//!
//! Besides the [`TonePort`](crate::app::ports::TonePort) implementation this
//! module carries the two fatal-halt beepers: once the firmware decides it
//! cannot run (no network, no relays, no server) it parks in one of these
//! loops forever so the cadence alone tells an operator what went wrong.

use std::thread;
use std::time::Duration;

use crate::app::ports::TonePort;

/// Alarm square-wave pitch.
pub const ALARM_FREQ_HZ: u32 = 880;

/// Target-reached jingle: (pitch in Hz, duration in ms).
pub const MELODY: [(u32, u32); 4] = [(523, 120), (659, 120), (784, 120), (1047, 240)];

/// Startup failed but the board is otherwise healthy: 0.5s on, 3s off.
pub fn halt_hang<T: TonePort>(tone: &mut T) -> ! {
    loop {
        tone.start_tone();
        thread::sleep(Duration::from_millis(500));
        tone.stop_tone();
        thread::sleep(Duration::from_millis(3000));
    }
}

/// Unrecoverable runtime error: 0.5s on, 1s off.
pub fn halt_panic<T: TonePort>(tone: &mut T) -> ! {
    loop {
        tone.start_tone();
        thread::sleep(Duration::from_millis(500));
        tone.stop_tone();
        thread::sleep(Duration::from_millis(1000));
    }
}

#[cfg(target_os = "espidf")]
mod hw {
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver};
    use esp_idf_hal::units::Hertz;

    use super::{ALARM_FREQ_HZ, MELODY};
    use crate::app::ports::TonePort;
    use crate::error::Error;

    pub struct LedcBuzzer {
        timer: LedcTimerDriver<'static>,
        channel: LedcDriver<'static>,
    }

    impl LedcBuzzer {
        pub fn new(timer: LedcTimerDriver<'static>, channel: LedcDriver<'static>) -> Self {
            Self { timer, channel }
        }

        fn tone_on(&mut self, freq_hz: u32) -> Result<(), Error> {
            self.timer
                .set_frequency(Hertz(freq_hz))
                .map_err(|_| Error::Init("ledc frequency"))?;
            let duty = self.channel.get_max_duty() / 2;
            self.channel
                .set_duty(duty)
                .map_err(|_| Error::Init("ledc duty"))?;
            Ok(())
        }

        fn tone_off(&mut self) {
            let _ = self.channel.set_duty(0);
        }
    }

    impl TonePort for LedcBuzzer {
        fn start_tone(&mut self) {
            if self.tone_on(ALARM_FREQ_HZ).is_err() {
                log::debug!("buzzer start failed");
            }
        }

        fn stop_tone(&mut self) {
            self.tone_off();
        }

        fn play_melody(&mut self) {
            for (freq, dur_ms) in MELODY {
                if self.tone_on(freq).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(u64::from(dur_ms)));
                self.tone_off();
                thread::sleep(Duration::from_millis(30));
            }
            self.tone_off();
        }
    }
}

#[cfg(target_os = "espidf")]
pub use hw::LedcBuzzer;

/// Host stand-in: records every call in order.
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct SimTone {
    pub events: Vec<ToneEvent>,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneEvent {
    On,
    Off,
    Melody,
}

#[cfg(not(target_os = "espidf"))]
impl SimTone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn melody_count(&self) -> usize {
        self.events.iter().filter(|e| **e == ToneEvent::Melody).count()
    }
}

#[cfg(not(target_os = "espidf"))]
impl TonePort for SimTone {
    fn start_tone(&mut self) {
        self.events.push(ToneEvent::On);
    }

    fn stop_tone(&mut self) {
        self.events.push(ToneEvent::Off);
    }

    fn play_melody(&mut self) {
        self.events.push(ToneEvent::Melody);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_records_calls_in_order() {
        let mut tone = SimTone::new();
        tone.start_tone();
        tone.stop_tone();
        tone.play_melody();
        assert_eq!(
            tone.events,
            vec![ToneEvent::On, ToneEvent::Off, ToneEvent::Melody]
        );
        assert_eq!(tone.melody_count(), 1);
    }
}
