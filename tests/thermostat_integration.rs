//! End-to-end service tests with mock adapters.
//!
//! Runs on host only; on ESP32 targets the mock rig is compiled out.

#![cfg(not(target_os = "espidf"))]

use heatkeeper::adapters::buzzer::{SimTone, ToneEvent};
use heatkeeper::adapters::display::SimDisplay;
use heatkeeper::adapters::ds18b20::SimSensors;
use heatkeeper::app::events::AppEvent;
use heatkeeper::app::ports::{EventSink, RelayTransport};
use heatkeeper::app::service::ThermostatService;
use heatkeeper::config::{SystemConfig, CHANNEL_COUNT, RELAY_NAMES};
use heatkeeper::control::Channel;
use heatkeeper::error::RelayError;
use heatkeeper::relay::Relay;

// ── Mocks ─────────────────────────────────────────────────────

const ADDRS: [&str; CHANNEL_COUNT] = ["10.0.0.1", "10.0.0.2"];

/// Simulated pair of plugs, addressed the way the transport sees them.
struct MockPlugs {
    on: [bool; CHANNEL_COUNT],
    /// Fail `set` calls for this channel.
    fail_set: [bool; CHANNEL_COUNT],
    /// Fail `query` calls for this channel (discovery).
    fail_query: [bool; CHANNEL_COUNT],
    commands: Vec<(usize, bool)>,
}

impl MockPlugs {
    fn new() -> Self {
        Self {
            on: [false; CHANNEL_COUNT],
            fail_set: [false; CHANNEL_COUNT],
            fail_query: [false; CHANNEL_COUNT],
            commands: Vec::new(),
        }
    }

    fn index(addr: &str) -> usize {
        ADDRS
            .iter()
            .position(|a| *a == addr)
            .expect("unknown plug address")
    }

    fn commands_for(&self, channel: usize) -> Vec<bool> {
        self.commands
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, on)| *on)
            .collect()
    }
}

impl RelayTransport for MockPlugs {
    fn query(&mut self, addr: &str) -> Result<bool, RelayError> {
        let i = Self::index(addr);
        if self.fail_query[i] {
            Err(RelayError::Connect)
        } else {
            Ok(self.on[i])
        }
    }

    fn set(&mut self, addr: &str, on: bool) -> Result<bool, RelayError> {
        let i = Self::index(addr);
        if self.fail_set[i] {
            return Err(RelayError::Timeout);
        }
        self.on[i] = on;
        self.commands.push((i, on));
        Ok(on)
    }
}

#[derive(Default)]
struct VecSink {
    events: Vec<AppEvent>,
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

impl VecSink {
    fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

// ── Rig ───────────────────────────────────────────────────────

struct Rig {
    service: ThermostatService,
    sensors: SimSensors,
    plugs: MockPlugs,
    display: SimDisplay,
    tone: SimTone,
    sink: VecSink,
    now_ms: u64,
}

const POLL_MS: u64 = 2000;

impl Rig {
    fn new() -> Self {
        Self::with_plugs(MockPlugs::new())
    }

    fn with_plugs(plugs: MockPlugs) -> Self {
        let mut config = SystemConfig::default();
        for (slot, addr) in config.relay_addrs.iter_mut().zip(ADDRS) {
            slot.push_str(addr).unwrap();
        }
        let channels: [Channel; CHANNEL_COUNT] = core::array::from_fn(|i| {
            Channel::new(i, Relay::new(RELAY_NAMES[i], config.relay_addrs[i].clone()))
        });
        Self {
            service: ThermostatService::new(config, channels),
            sensors: SimSensors::new(),
            plugs,
            display: SimDisplay::new(),
            tone: SimTone::new(),
            sink: VecSink::default(),
            now_ms: 0,
        }
    }

    fn discover(&mut self) -> Result<(), heatkeeper::error::Error> {
        self.service
            .discover(&mut self.plugs, &mut self.display, &mut self.sink)
    }

    /// One scheduler iteration, `dt_ms` after the previous one.
    fn tick(&mut self, dt_ms: u64) -> bool {
        self.now_ms += dt_ms;
        self.service.tick(
            self.now_ms,
            &mut self.sensors,
            &mut self.plugs,
            &mut self.display,
            &mut self.tone,
            &mut self.sink,
        )
    }

    /// Advance a full poll interval with both probes reading `t`.
    fn poll_both(&mut self, t: f32) {
        self.sensors.set(0, Some(t));
        self.sensors.set(1, Some(t));
        assert!(self.tick(POLL_MS), "a full interval must trigger a poll");
    }
}

// ── Warm-up scenario ──────────────────────────────────────────

#[test]
fn heats_to_target_chimes_once_and_resumes() {
    let mut rig = Rig::new();
    rig.discover().unwrap();

    // 80: cold start, both relays switch on.
    rig.poll_both(80.0);
    assert_eq!(rig.plugs.commands_for(0), vec![true]);
    assert_eq!(rig.plugs.commands_for(1), vec![true]);

    // 88: still below target, no new commands.
    rig.poll_both(88.0);
    assert_eq!(rig.plugs.commands.len(), 2);

    // 91: target reached — both off, one melody per channel.
    rig.poll_both(91.0);
    assert_eq!(rig.plugs.commands_for(0), vec![true, false]);
    assert_eq!(rig.plugs.commands_for(1), vec![true, false]);
    assert_eq!(rig.tone.melody_count(), 2);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::TargetReached { .. })),
        2
    );

    // 96: above the warning threshold, alarm rings on the next iteration.
    rig.poll_both(96.0);
    assert_eq!(rig.service.status_text(), "OVERHEAT");
    rig.poll_both(96.0);
    assert!(rig.service.is_alarm_ringing());
    assert!(rig.service.snapshot().alarm);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRaised)), 1);

    // 91: back below warning, the alarm clears.
    rig.poll_both(91.0);
    rig.poll_both(91.0);
    assert!(!rig.service.is_alarm_ringing());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmCleared)), 1);

    // 89: cooled below target, heating resumes — and no second melody.
    rig.poll_both(89.0);
    assert_eq!(rig.plugs.commands_for(0), vec![true, false, true]);
    assert_eq!(rig.tone.melody_count(), 2);
}

// ── Relay faults ──────────────────────────────────────────────

#[test]
fn failed_off_command_rings_until_a_retry_succeeds() {
    let mut rig = Rig::new();
    rig.discover().unwrap();
    rig.poll_both(80.0);

    // The off command starts failing.
    rig.plugs.fail_set = [true; CHANNEL_COUNT];
    for _ in 0..3 {
        rig.poll_both(92.0);
    }
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::RelayFault { .. })),
        6,
        "one fault event per channel per poll"
    );
    assert!(rig.service.is_alarm_ringing());
    assert!(rig.service.status_text().starts_with("Relay fault"));
    // The device still believes the relays are on.
    assert_eq!(rig.service.snapshot().relay1.as_str(), "on");

    // Plugs come back; the retried off lands and the alarm clears.
    rig.plugs.fail_set = [false; CHANNEL_COUNT];
    rig.poll_both(92.0);
    rig.poll_both(92.0);
    assert!(!rig.service.is_alarm_ringing());
    assert_eq!(rig.service.snapshot().relay1.as_str(), "off");
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRaised)), 1);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmCleared)), 1);
    // Melody fired once per channel on the first (failed) reach.
    assert_eq!(rig.tone.melody_count(), 2);
}

// ── Discovery ─────────────────────────────────────────────────

#[test]
fn undiscovered_relay_is_excluded_for_the_whole_run() {
    let mut plugs = MockPlugs::new();
    plugs.fail_query[1] = true;
    let mut rig = Rig::with_plugs(plugs);
    rig.discover().unwrap();
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::RelayUnavailable { channel: 1 })),
        1
    );

    for _ in 0..4 {
        rig.poll_both(80.0);
    }
    assert_eq!(rig.plugs.commands_for(0), vec![true]);
    assert!(rig.plugs.commands_for(1).is_empty());

    let snap = rig.service.snapshot();
    assert_eq!(snap.relay1.as_str(), "on");
    assert_eq!(snap.relay2.as_str(), "--");
    assert_eq!(snap.temp2.as_str(), "--");
    assert!(!snap.alarm, "an undiscovered relay is not a runtime fault");
}

#[test]
fn discovery_fails_when_no_relay_answers() {
    let mut plugs = MockPlugs::new();
    plugs.fail_query = [true; CHANNEL_COUNT];
    let mut rig = Rig::with_plugs(plugs);
    assert!(rig.discover().is_err());
}

#[test]
fn discovery_adopts_the_reported_state() {
    let mut plugs = MockPlugs::new();
    plugs.on[0] = true; // plug was left on across a controller reboot
    let mut rig = Rig::with_plugs(plugs);
    rig.discover().unwrap();

    // Already on and below target: nothing to command.
    rig.poll_both(80.0);
    assert!(rig.plugs.commands_for(0).is_empty());
    // Above target: the inherited on-state is switched off.
    rig.poll_both(91.0);
    assert_eq!(rig.plugs.commands_for(0), vec![false]);
}

// ── Alarm cadence and scheduler interplay ─────────────────────

#[test]
fn alarm_square_wave_runs_between_polls() {
    let mut rig = Rig::new();
    rig.discover().unwrap();
    rig.poll_both(96.0);
    rig.poll_both(96.0);
    assert!(rig.service.is_alarm_ringing());

    let polls_before = rig.service.poll_count();
    let snapshot_before = rig.service.snapshot().clone();
    let events_before = rig.tone.events.len();

    // 1.2 s of 50 ms iterations, not enough for another poll: the alarm
    // keeps toggling at its 300 ms half-period — 4 flips.
    for _ in 0..24 {
        assert!(!rig.tick(50));
    }
    let flips = rig.tone.events[events_before..]
        .iter()
        .filter(|e| matches!(e, ToneEvent::On | ToneEvent::Off))
        .count();
    assert!((3..=5).contains(&flips), "expected ~4 flips, got {flips}");

    // No poll ran, so the published snapshot did not move.
    assert_eq!(rig.service.poll_count(), polls_before);
    assert_eq!(rig.service.snapshot().temp1, snapshot_before.temp1);
}

#[test]
fn spinner_only_advances_while_the_alarm_is_silent() {
    let mut rig = Rig::new();
    rig.discover().unwrap();

    rig.poll_both(80.0);
    let healthy = rig.service.status_text().to_string();
    assert!(healthy.contains('*'), "healthy status is the spinner track");

    rig.poll_both(96.0);
    rig.poll_both(96.0);
    assert!(rig.service.is_alarm_ringing());
    rig.poll_both(96.0);
    assert_eq!(rig.service.status_text(), "OVERHEAT");

    // Clear; the spinner picks back up.
    rig.poll_both(80.0);
    rig.poll_both(80.0);
    assert!(rig.service.status_text().contains('*'));
}

// ── Sensor dropouts ───────────────────────────────────────────

#[test]
fn missing_reading_skips_control_but_keeps_the_other_channel() {
    let mut rig = Rig::new();
    rig.discover().unwrap();

    rig.sensors.set(0, None);
    rig.sensors.set(1, Some(80.0));
    assert!(rig.tick(POLL_MS));

    assert!(rig.plugs.commands_for(0).is_empty());
    assert_eq!(rig.plugs.commands_for(1), vec![true]);

    let snap = rig.service.snapshot();
    assert_eq!(snap.temp1.as_str(), "--");
    assert_eq!(snap.temp2.as_str(), "80.0");
    assert!(!snap.alarm, "a probe dropout is not a fault");
}
