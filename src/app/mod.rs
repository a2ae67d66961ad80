//! Application core: the monitor loop and its port boundary, zero I/O.
//!
//! The hysteresis rule and the consume/read/evaluate/emit cycle live here.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod ports;
pub mod service;
