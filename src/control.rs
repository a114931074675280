//! Bang-bang temperature control and the warmed-up notification latch.
//!
//! Deliberately simple on/off control switching strictly at the target
//! boundary — no deadband, no proportional term. A reading sitting exactly
//! on the target can therefore cause command chatter on consecutive polls;
//! this is existing, documented behavior of the device, not a bug.
//!
//! Each [`Channel`] pairs one sensor with one [`Relay`] and carries the
//! one-shot `warmed_up` latch: the first time a channel reaches target
//! while heating, the fixed melody plays and the latch closes for the rest
//! of the process lifetime.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, RelayTransport, TonePort};
use crate::error::RelayError;
use crate::relay::Relay;

// ---------------------------------------------------------------------------
// Decision function
// ---------------------------------------------------------------------------

/// What the controller wants to do with the relay this poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Reading is at or above target while heating: switch off.
    TurnOff,
    /// Reading is below target while idle: switch on.
    TurnOn,
    /// Already in the desired state.
    Hold,
}

/// Pure bang-bang decision from a reading, the target, and the relay's
/// last commanded state.
pub fn decide(reading: f32, target: f32, is_on: bool) -> Decision {
    if reading >= target && is_on {
        Decision::TurnOff
    } else if reading < target && !is_on {
        Decision::TurnOn
    } else {
        Decision::Hold
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// One (sensor, relay) pairing driven toward the shared target.
#[derive(Debug)]
pub struct Channel {
    /// Channel index, used for events and sensor addressing.
    pub index: usize,
    pub relay: Relay,
    /// One-shot latch: closes the first time target is reached while
    /// heating; never reopens, even if the channel cools and re-heats.
    pub warmed_up: bool,
}

impl Channel {
    pub fn new(index: usize, relay: Relay) -> Self {
        Self {
            index,
            relay,
            warmed_up: false,
        }
    }

    /// Run one control step for this channel.
    ///
    /// Issues at most one relay command. A failed command raises the
    /// relay's error flag (inside [`Relay::command`]) and is surfaced to
    /// the caller for the fault status text; there is no in-poll retry —
    /// the next poll cycle retries naturally.
    ///
    /// The reached-target event is evaluated on the turn-off branch using
    /// the **pre-command** relay state, and fires after the off command
    /// whether or not that command succeeded.
    pub fn step(
        &mut self,
        reading: f32,
        target: f32,
        transport: &mut impl RelayTransport,
        tone: &mut impl TonePort,
        sink: &mut impl EventSink,
    ) -> Result<(), RelayError> {
        debug_assert!(self.relay.enabled, "disabled channels must be skipped");

        match decide(reading, target, self.relay.commanded_state) {
            Decision::TurnOff => {
                let first_reach = !self.warmed_up;
                let result = self.relay.command(transport, false).map(|_| ());
                if first_reach {
                    info!(
                        "channel {}: reached {target:.1} C for the first time",
                        self.index
                    );
                    tone.play_melody();
                    sink.emit(&AppEvent::TargetReached { channel: self.index });
                    self.warmed_up = true;
                }
                result
            }
            Decision::TurnOn => self.relay.command(transport, true).map(|_| ()),
            Decision::Hold => Ok(()),
        }
    }
}
