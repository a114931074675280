//! Heatkeeper firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within the adapter modules.

#![deny(unused_must_use)]

pub mod alarm;
pub mod app;
pub mod config;
pub mod control;
pub mod relay;

pub mod error;

// Adapter modules compile on every target; the actual hardware/network
// implementations are guarded by cfg attributes inside.
pub mod adapters;
