//! Outbound application events and the HTTP status snapshot.
//!
//! The [`ThermostatService`](super::service::ThermostatService) emits
//! [`AppEvent`]s through the [`EventSink`](super::ports::EventSink) port and
//! publishes a [`StatusSnapshot`] once per poll cycle for the read-only web
//! front end.

use serde::Serialize;

use crate::error::RelayError;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started; carries the number of enabled channels.
    Started { enabled_channels: usize },

    /// A relay answered its discovery probe (with its reported state).
    RelayDiscovered { channel: usize, is_on: bool },

    /// A relay never answered discovery and is disabled for this run.
    RelayUnavailable { channel: usize },

    /// A channel reached the target temperature for the first time.
    TargetReached { channel: usize },

    /// A relay command failed during control.
    RelayFault { channel: usize, error: RelayError },

    /// The alarm started ringing (overheat or relay fault).
    AlarmRaised,

    /// All fault conditions cleared; the alarm fell silent.
    AlarmCleared,
}

/// Fixed-width display text for one temperature field (e.g. `"87.5"`, `"--"`).
pub type TempText = heapless::String<8>;

/// A point-in-time snapshot of what the device would tell you, suitable for
/// the `/temp` JSON endpoint. Written by the control loop once per poll;
/// read by the HTTP handlers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusSnapshot {
    /// Channel temperatures as display strings (`"--"` when unavailable).
    pub temp1: TempText,
    pub temp2: TempText,
    /// Relay states as `"on"` / `"off"` (`"--"` when never discovered).
    pub relay1: heapless::String<4>,
    pub relay2: heapless::String<4>,
    /// True while the alarm is ringing.
    pub alarm: bool,
}
