//! Application layer: the hardware-agnostic control core and its port
//! boundary. See [`service::ThermostatService`] for the orchestration and
//! [`ports`] for the traits adapters implement.

pub mod events;
pub mod ports;
pub mod service;
