//! Alarm state machine: a binary ringing/silent machine aggregating
//! overheat and relay-fault conditions into one audible signal.
//!
//! ```text
//!  SILENT ──[overheat OR any relay.error]──▶ RINGING
//!  RINGING ──[no overheat AND no errors]──▶ SILENT
//! ```
//!
//! While ringing the buzzer is driven as a square wave with a fixed
//! half-period, toggled from the scheduler loop at every iteration — this
//! gives the audible pulse sub-poll-interval timing resolution, independent
//! of the 2 s sensor cadence.
//!
//! There is no debounce in either direction: the alarm rings the instant a
//! fault appears and falls silent the instant a poll observes none. That a
//! flapping fault produces a flapping alarm is existing device behavior.

use log::{info, warn};

use crate::app::ports::TonePort;

/// Silent/Ringing machine with the audible half-period toggle.
#[derive(Debug)]
pub struct Alarm {
    ringing: bool,
    /// Half-period square-wave phase: true = tone on.
    cycle: bool,
    /// Timestamp of the last phase flip (ms, monotonic).
    last_toggle_ms: u64,
    half_period_ms: u64,
}

impl Alarm {
    pub fn new(half_period_ms: u64) -> Self {
        Self {
            ringing: false,
            cycle: false,
            last_toggle_ms: 0,
            half_period_ms,
        }
    }

    /// True while the alarm is ringing.
    pub fn is_ringing(&self) -> bool {
        self.ringing
    }

    /// Advance the machine one scheduler iteration.
    ///
    /// `fault` is the aggregated condition (`overheat OR any relay error`),
    /// recomputed by the caller every iteration. Returns `true` when the
    /// ringing state changed, so the caller can update status text and emit
    /// an event.
    pub fn tick(&mut self, now_ms: u64, fault: bool, tone: &mut impl TonePort) -> bool {
        match (self.ringing, fault) {
            (false, true) => {
                // Ring immediately; the first half-period starts now.
                self.ringing = true;
                self.cycle = true;
                self.last_toggle_ms = now_ms;
                tone.start_tone();
                warn!("alarm: ringing");
                true
            }
            (true, false) => {
                self.ringing = false;
                self.cycle = false;
                tone.stop_tone();
                info!("alarm: cleared");
                true
            }
            (true, true) => {
                if now_ms.saturating_sub(self.last_toggle_ms) >= self.half_period_ms {
                    self.cycle = !self.cycle;
                    self.last_toggle_ms = now_ms;
                    if self.cycle {
                        tone.start_tone();
                    } else {
                        tone.stop_tone();
                    }
                }
                false
            }
            (false, false) => false,
        }
    }
}
