//! System configuration parameters.
//!
//! All tunable parameters for the thermostat. Values are read once from the
//! process environment at startup; there is no persistence and no hot
//! reload — a restart picks up new values.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of (sensor, relay) channels the device drives.
pub const CHANNEL_COUNT: usize = 2;

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Thresholds ---
    /// Target temperature (°C), shared by both channels.
    pub target_temp_c: f32,
    /// Overheat warning threshold (°C); any reading above rings the alarm.
    pub warning_temp_c: f32,

    // --- Timing ---
    /// Sensor poll / control interval (milliseconds).
    pub poll_interval_ms: u64,
    /// Alarm buzzer half-period while ringing (milliseconds).
    pub alarm_half_period_ms: u64,
    /// Per-call timeout for relay network requests (milliseconds).
    pub relay_timeout_ms: u64,

    // --- Network identities ---
    /// Plug host addresses, one per channel (IP or hostname).
    pub relay_addrs: [heapless::String<48>; CHANNEL_COUNT],
    /// WiFi station credentials.
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

/// Display names for the two relays, fixed for the device's lifetime.
pub const RELAY_NAMES: [&str; CHANNEL_COUNT] = ["left", "right"];

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            target_temp_c: 90.0,
            warning_temp_c: 95.0,

            poll_interval_ms: 2000,
            alarm_half_period_ms: 300,
            relay_timeout_ms: 3000,

            relay_addrs: [heapless::String::new(), heapless::String::new()],
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
        }
    }
}

impl SystemConfig {
    /// Load configuration from the process environment.
    ///
    /// Recognised variables: `TARGET_TEMP`, `WARNING_TEMP`, `PLUG_IP_1`,
    /// `PLUG_IP_2`, `WIFI_SSID`, `WIFI_PASSWORD`. Numbers that fail to
    /// parse fall back to the defaults — the device must come up even with
    /// a mangled `TARGET_TEMP` string.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(t) = env_f32("TARGET_TEMP") {
            cfg.target_temp_c = t;
        }
        if let Some(t) = env_f32("WARNING_TEMP") {
            cfg.warning_temp_c = t;
        }
        if let Ok(addr) = std::env::var("PLUG_IP_1") {
            cfg.relay_addrs[0] = truncated(&addr);
        }
        if let Ok(addr) = std::env::var("PLUG_IP_2") {
            cfg.relay_addrs[1] = truncated(&addr);
        }
        if let Ok(ssid) = std::env::var("WIFI_SSID") {
            cfg.wifi_ssid = truncated(&ssid);
        }
        if let Ok(pw) = std::env::var("WIFI_PASSWORD") {
            cfg.wifi_password = truncated(&pw);
        }

        cfg
    }

    /// Sanity-check the configuration before handing it to the service.
    pub fn validate(&self) -> Result<(), Error> {
        if self.warning_temp_c <= self.target_temp_c {
            return Err(Error::Config("warning temperature must exceed target"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll interval must be non-zero"));
        }
        if self.alarm_half_period_ms == 0 {
            return Err(Error::Config("alarm half-period must be non-zero"));
        }
        if self.alarm_half_period_ms >= self.poll_interval_ms {
            return Err(Error::Config("alarm half-period must be below poll interval"));
        }
        Ok(())
    }
}

fn env_f32(key: &str) -> Option<f32> {
    std::env::var(key).ok()?.trim().parse().ok()
}

/// Copy a string into a fixed-capacity buffer, dropping any overflow.
fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
