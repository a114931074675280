//! Port traits — the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ThermostatService (domain)
//! ```
//!
//! Driven adapters (sensors, relay transport, display, buzzer, event sinks)
//! implement these traits. The [`ThermostatService`](super::service::ThermostatService)
//! consumes them via generics, so the control core never touches hardware or
//! the network directly and every test can inject mocks.

use crate::error::RelayError;

// ───────────────────────────────────────────────────────────────
// Temperature source (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the core calls this once per poll cycle per channel.
pub trait TemperaturePort {
    /// Current reading for `channel` in °C, or `None` when the channel is
    /// unavailable this cycle (bus error, CRC failure, missing probe).
    /// An unavailable channel is skipped by the controller and rendered as
    /// a placeholder on the display.
    fn read(&mut self, channel: usize) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Relay transport (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

/// Network transport for the remote power plugs.
///
/// Both operations return the remote's **self-reported** on/off state, not
/// an echo of the request. Every call carries a fixed short timeout; a
/// timeout surfaces as an ordinary [`RelayError`].
pub trait RelayTransport {
    /// Query the plug's current state without changing it.
    fn query(&mut self, addr: &str) -> Result<bool, RelayError>;

    /// Request the plug on or off; returns the state the plug reports back.
    fn set(&mut self, addr: &str, on: bool) -> Result<bool, RelayError>;
}

// ───────────────────────────────────────────────────────────────
// Display sink (driven adapter: domain → panel)
// ───────────────────────────────────────────────────────────────

/// Presentational status display. Last write wins; no queuing, no logic.
pub trait DisplayPort {
    /// Readings view: two temperature fields plus a one-line status text.
    fn show_readings(&mut self, t1: &str, t2: &str, status: &str);

    /// Message view: two lines of free text (startup progress, fatal errors).
    fn show_message(&mut self, line1: &str, line2: &str);
}

// ───────────────────────────────────────────────────────────────
// Audio sink (driven adapter: domain → buzzer)
// ───────────────────────────────────────────────────────────────

/// Buzzer control. `play_melody` blocks for the melody's duration.
pub trait TonePort {
    /// Begin a continuous tone (alarm half-period "on" phase).
    fn start_tone(&mut self);

    /// Silence the buzzer.
    fn stop_tone(&mut self);

    /// Play the fixed target-reached melody once, synchronously.
    fn play_melody(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s through
/// this port. Adapters decide where they go (serial log, future telemetry).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
