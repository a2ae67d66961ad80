//! Log-based alert and telemetry adapter.
//!
//! Implements [`AlertSink`] and [`TelemetryReporter`] by writing to the
//! `log` facade (the ESP-IDF logger on target, so UART / USB-CDC).  A
//! telemetry radio adapter would implement the same traits.

use log::{info, warn};

use crate::app::ports::{AlertSink, TelemetryReporter};

/// Adapter that logs every alert and sample to the console.
#[derive(Debug, Default)]
pub struct LogSink {
    samples: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self { samples: 0 }
    }

    /// Telemetry samples written so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl AlertSink for LogSink {
    fn on_over_temperature(&mut self) {
        warn!("ALERT | Over temperature detected!");
    }

    fn on_safe_conditions(&mut self) {
        info!("ALERT | Returned to safe operating conditions!");
    }
}

impl TelemetryReporter for LogSink {
    fn on_telemetry(&mut self, celsius: f32) {
        self.samples += 1;
        info!("TELEM | Temperature telemetry: {:.3} deg C", celsius);
    }
}
