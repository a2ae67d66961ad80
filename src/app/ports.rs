//! Port traits: the boundary between the monitor loop and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ThermalMonitor (domain)
//! ```
//!
//! Driven adapters (the LM75BD driver, the simulated sensor, the log sink)
//! implement these traits.  The [`ThermalMonitor`](super::service::ThermalMonitor)
//! owns them via generics, so the loop never touches hardware directly and
//! runs unchanged against test doubles.

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one synchronous Celsius sample per call.
///
/// Only the monitor task calls this in steady state.
pub trait TemperatureSensor {
    fn read_celsius(&mut self, address: u8) -> Result<f32, SensorError>;
}

impl<S: TemperatureSensor + ?Sized> TemperatureSensor for &mut S {
    fn read_celsius(&mut self, address: u8) -> Result<f32, SensorError> {
        (**self).read_celsius(address)
    }
}

// ───────────────────────────────────────────────────────────────
// Output ports (driven adapters: domain → alerts / telemetry)
// ───────────────────────────────────────────────────────────────

/// Receives threshold crossings.  Fire-and-forget.
pub trait AlertSink {
    fn on_over_temperature(&mut self);

    fn on_safe_conditions(&mut self);
}

/// Receives every successfully read sample.  Fire-and-forget.
pub trait TelemetryReporter {
    fn on_telemetry(&mut self, celsius: f32);
}

impl<A: AlertSink + ?Sized> AlertSink for &mut A {
    fn on_over_temperature(&mut self) {
        (**self).on_over_temperature();
    }

    fn on_safe_conditions(&mut self) {
        (**self).on_safe_conditions();
    }
}

impl<T: TelemetryReporter + ?Sized> TelemetryReporter for &mut T {
    fn on_telemetry(&mut self, celsius: f32) {
        (**self).on_telemetry(celsius);
    }
}
