//! Thermostat service — the hexagonal core.
//!
//! [`ThermostatService`] owns the channels, the alarm machine, and the
//! status/spinner text. All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  TemperaturePort ──▶ ┌──────────────────────────┐ ──▶ DisplayPort
//!                      │    ThermostatService      │ ──▶ TonePort
//!  RelayTransport ◀──▶ │  channels · alarm · latch │ ──▶ EventSink
//!                      └──────────────────────────┘
//! ```
//!
//! ## Timing model
//!
//! [`tick`](ThermostatService::tick) runs every scheduler iteration and is
//! cheap: it re-aggregates the fault condition and advances the alarm
//! toggle (which needs sub-poll timing resolution). The full poll cycle —
//! sensor reads, display update, hysteresis control — runs only when the
//! poll interval has elapsed.
//!
//! Relay commands are synchronous with a bounded per-call timeout, so a
//! slow plug stalls the whole iteration, including the other channel and
//! the alarm toggle. The port boundary is the place to introduce a tick
//! deadline if it ever becomes a problem.
//!
//! ## Ordering guarantee
//!
//! Within one poll cycle: sensor reads happen before control decisions,
//! which happen before display/audio side effects are issued. Across
//! cycles, only relay state, the warmed-up latches, the latched overheat
//! flag, and the alarm state persist.

use core::fmt::Write as _;

use log::warn;

use crate::alarm::Alarm;
use crate::config::{SystemConfig, CHANNEL_COUNT};
use crate::control::Channel;
use crate::error::Error;

use super::events::{AppEvent, StatusSnapshot, TempText};
use super::ports::{DisplayPort, EventSink, RelayTransport, TemperaturePort, TonePort};

/// Width of the idle spinner track (dashes around the moving star).
const SPINNER_WIDTH: usize = 22;

/// Status line, spinner track plus star.
type StatusText = heapless::String<24>;

/// The thermostat service orchestrates all domain logic.
pub struct ThermostatService {
    config: SystemConfig,
    channels: [Channel; CHANNEL_COUNT],
    alarm: Alarm,
    /// Overheat as of the last completed poll cycle.
    overheat: bool,
    last_poll_ms: u64,
    spinner_pos: usize,
    status_text: StatusText,
    snapshot: StatusSnapshot,
    polls: u64,
}

impl ThermostatService {
    /// Construct the service. Does **not** talk to the network — call
    /// [`discover`](Self::discover) next.
    pub fn new(config: SystemConfig, channels: [Channel; CHANNEL_COUNT]) -> Self {
        let alarm = Alarm::new(config.alarm_half_period_ms);
        Self {
            config,
            channels,
            alarm,
            overheat: false,
            last_poll_ms: 0,
            spinner_pos: 0,
            status_text: StatusText::new(),
            snapshot: StatusSnapshot::default(),
            polls: 0,
        }
    }

    // ── Discovery ─────────────────────────────────────────────

    /// Probe each relay once, enabling the ones that answer.
    ///
    /// A relay that never answers stays disabled for the process lifetime:
    /// it is skipped by control and rendered as `--`. When *no* relay
    /// answers the device has nothing to do and the caller halts with the
    /// fatal buzzer pattern.
    pub fn discover(
        &mut self,
        transport: &mut impl RelayTransport,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        for ch in &mut self.channels {
            display.show_message("Searching for relay:", ch.relay.name);
            match ch.relay.probe(transport) {
                Ok(is_on) => {
                    sink.emit(&AppEvent::RelayDiscovered {
                        channel: ch.index,
                        is_on,
                    });
                }
                Err(e) => {
                    warn!("relay {} not found: {e}", ch.relay.name);
                    display.show_message("Relay not found:", ch.relay.name);
                    sink.emit(&AppEvent::RelayUnavailable { channel: ch.index });
                }
            }
        }

        let enabled = self.channels.iter().filter(|c| c.relay.enabled).count();
        if enabled == 0 {
            return Err(Error::Init("no relays discovered"));
        }
        sink.emit(&AppEvent::Started {
            enabled_channels: enabled,
        });
        Ok(())
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one scheduler iteration. Returns `true` when a full poll cycle
    /// ran (the status snapshot was refreshed).
    pub fn tick(
        &mut self,
        now_ms: u64,
        sensors: &mut impl TemperaturePort,
        transport: &mut impl RelayTransport,
        display: &mut impl DisplayPort,
        tone: &mut impl TonePort,
        sink: &mut impl EventSink,
    ) -> bool {
        // 1. Alarm machine, every iteration: the audible toggle needs finer
        //    timing than the poll cadence provides.
        let fault = self.overheat || self.channels.iter().any(|c| c.relay.error);
        if self.alarm.tick(now_ms, fault, tone) {
            if self.alarm.is_ringing() {
                sink.emit(&AppEvent::AlarmRaised);
            } else {
                sink.emit(&AppEvent::AlarmCleared);
            }
        }

        // 2. Full poll cycle once the interval has elapsed.
        if now_ms.saturating_sub(self.last_poll_ms) < self.config.poll_interval_ms {
            return false;
        }
        self.last_poll_ms = now_ms;
        self.poll_cycle(sensors, transport, display, tone, sink);
        true
    }

    /// Sensor reads → display → overheat recompute → hysteresis control.
    fn poll_cycle(
        &mut self,
        sensors: &mut impl TemperaturePort,
        transport: &mut impl RelayTransport,
        display: &mut impl DisplayPort,
        tone: &mut impl TonePort,
        sink: &mut impl EventSink,
    ) {
        self.polls += 1;

        let readings: [Option<f32>; CHANNEL_COUNT] =
            core::array::from_fn(|i| sensors.read(i));

        // Idle spinner, so the panel visibly isn't frozen. The alarm's
        // status text takes priority and must not be overwritten.
        if !self.alarm.is_ringing() {
            self.status_text = spinner_text(self.spinner_pos);
            self.spinner_pos = (self.spinner_pos + 1) % (SPINNER_WIDTH - 1);
        }

        let texts: [TempText; CHANNEL_COUNT] = core::array::from_fn(|i| {
            temp_text(readings[i], self.channels[i].relay.enabled)
        });
        display.show_readings(&texts[0], &texts[1], &self.status_text);

        // Overheat is recomputed once per poll cycle; unavailable channels
        // contribute nothing.
        self.overheat = readings
            .iter()
            .flatten()
            .any(|r| *r > self.config.warning_temp_c);
        if self.overheat {
            self.set_status("OVERHEAT");
        }

        for (ch, reading) in self.channels.iter_mut().zip(readings) {
            if !ch.relay.enabled {
                continue;
            }
            let Some(t) = reading else {
                warn!("channel {}: no reading this cycle", ch.index);
                continue;
            };
            if let Err(e) = ch.step(t, self.config.target_temp_c, transport, tone, sink) {
                sink.emit(&AppEvent::RelayFault {
                    channel: ch.index,
                    error: e,
                });
                let mut text = StatusText::new();
                let _ = write!(text, "Relay fault {}", ch.relay.name);
                self.status_text = text;
            }
        }

        self.snapshot = self.build_snapshot(&texts);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot refreshed by the most recent poll cycle.
    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    pub fn is_alarm_ringing(&self) -> bool {
        self.alarm.is_ringing()
    }

    /// Current status line (spinner while healthy, fault text otherwise).
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn channels(&self) -> &[Channel; CHANNEL_COUNT] {
        &self.channels
    }

    /// Completed poll cycles since startup.
    pub fn poll_count(&self) -> u64 {
        self.polls
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_status(&mut self, text: &str) {
        self.status_text.clear();
        let _ = self.status_text.push_str(text);
    }

    fn build_snapshot(&self, texts: &[TempText; CHANNEL_COUNT]) -> StatusSnapshot {
        let relay_state = |i: usize| {
            let mut s = heapless::String::new();
            let _ = s.push_str(self.channels[i].relay.state_text());
            s
        };
        StatusSnapshot {
            temp1: texts[0].clone(),
            temp2: texts[1].clone(),
            relay1: relay_state(0),
            relay2: relay_state(1),
            alarm: self.alarm.is_ringing(),
        }
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Render a reading with one decimal place; `--` for disabled channels and
/// failed reads.
fn temp_text(reading: Option<f32>, enabled: bool) -> TempText {
    let mut out = TempText::new();
    match reading {
        Some(t) if enabled => {
            let _ = write!(out, "{t:.1}");
        }
        _ => {
            let _ = out.push_str("--");
        }
    }
    out
}

/// A star walking along a dashed track.
fn spinner_text(pos: usize) -> StatusText {
    let mut out = StatusText::new();
    for _ in 0..pos {
        let _ = out.push('-');
    }
    let _ = out.push('*');
    for _ in pos..SPINNER_WIDTH {
        let _ = out.push('-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_text_formats_one_decimal() {
        assert_eq!(temp_text(Some(87.46), true).as_str(), "87.5");
        assert_eq!(temp_text(Some(90.0), true).as_str(), "90.0");
    }

    #[test]
    fn temp_text_placeholder_for_disabled_or_missing() {
        assert_eq!(temp_text(Some(87.5), false).as_str(), "--");
        assert_eq!(temp_text(None, true).as_str(), "--");
    }

    #[test]
    fn spinner_walks_and_keeps_width() {
        let a = spinner_text(0);
        let b = spinner_text(5);
        assert_eq!(a.len(), SPINNER_WIDTH + 1);
        assert_eq!(b.len(), SPINNER_WIDTH + 1);
        assert!(a.starts_with('*'));
        assert_eq!(&b[5..6], "*");
    }
}
