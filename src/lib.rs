//! Thermal manager library.
//!
//! Exposes the queue, the monitor and the send API for integration testing
//! and for the firmware binary.  ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod queue;
pub mod thresholds;

pub mod adapters;
pub mod drivers;
pub mod sensors;

pub use error::{Error, Result, SensorError};
pub use events::ThermalEvent;
pub use manager::{THERMAL_MANAGER, ThermalManager, os_handler};
