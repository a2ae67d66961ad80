//! Adapters: concrete implementations of the output port traits.
//!
//! | Adapter    | Implements                      | Connects to         |
//! |------------|---------------------------------|---------------------|
//! | `log_sink` | AlertSink, TelemetryReporter    | Serial log output   |
//!
//! Sensor adapters live in [`crate::sensors`].

pub mod log_sink;
