//! Unified error types for the heatkeeper firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be passed through the control core without allocation.
//!
//! The taxonomy mirrors the failure classes of the device:
//!
//! - **Startup failures** (`Init`, `Config`) are fatal; the binary halts
//!   with a distinct buzzer pattern and waits for a manual restart.
//! - **Transient relay failures** (`Relay`) set the relay's error flag,
//!   ring the alarm, and are retried on the next poll cycle.
//! - **Sensor failures** (`Sensor`) make a channel unavailable for one
//!   poll cycle.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A relay network command or query failed.
    Relay(RelayError),
    /// A temperature sensor could not be read.
    Sensor(SensorError),
    /// Peripheral or network bring-up failed (fatal).
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relay(e) => write!(f, "relay: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Relay transport errors
// ---------------------------------------------------------------------------

/// Failure of a single network call against a remote plug.
///
/// A timeout is deliberately indistinguishable in effect from any other
/// transport failure: the caller marks the relay faulted and retries on
/// the next poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// The call did not complete within the fixed per-call timeout.
    Timeout,
    /// TCP connect to the plug failed.
    Connect,
    /// The plug answered with a non-success HTTP status.
    BadStatus(u16),
    /// The reply body could not be parsed (missing or malformed `ison`).
    BadResponse,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Connect => write!(f, "connect failed"),
            Self::BadStatus(code) => write!(f, "HTTP status {code}"),
            Self::BadResponse => write!(f, "malformed reply"),
        }
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The OneWire bus transaction failed.
    BusError,
    /// The scratchpad CRC did not match.
    CrcMismatch,
    /// Fewer probes were found on the bus than channels configured.
    NotFound,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusError => write!(f, "bus transaction failed"),
            Self::CrcMismatch => write!(f, "CRC mismatch"),
            Self::NotFound => write!(f, "probe not found"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
