//! Adapters — implementations of the port traits for real hardware and
//! the network.
//!
//! Every module compiles on every target; the ESP-IDF code paths are
//! guarded by `#[cfg(target_os = "espidf")]` with in-memory fallbacks so
//! the crate (and its tests) build on the host.

pub mod buzzer;
pub mod display;
pub mod ds18b20;
pub mod http_server;
pub mod log_sink;
pub mod shelly;
pub mod time;
pub mod wifi;
