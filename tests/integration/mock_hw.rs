//! Mock hardware adapters for integration tests.
//!
//! Records every alert and telemetry call so tests can assert on the full
//! output history without a real sensor or serial console.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use thermalmgr::SensorError;
use thermalmgr::app::ports::{AlertSink, TelemetryReporter, TemperatureSensor};

// ── Output record ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Over,
    Safe,
    Telemetry(f32),
}

// ── ScriptedSensor ────────────────────────────────────────────

/// Returns queued readings in order, then a bus error once exhausted.
pub struct ScriptedSensor {
    readings: VecDeque<Result<f32, SensorError>>,
    pub addresses: Vec<u8>,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new(readings: &[f32]) -> Self {
        Self {
            readings: readings.iter().copied().map(Ok).collect(),
            addresses: Vec::new(),
        }
    }

    pub fn push_failure(&mut self, error: SensorError) {
        self.readings.push_back(Err(error));
    }

    pub fn push_reading(&mut self, celsius: f32) {
        self.readings.push_back(Ok(celsius));
    }
}

impl TemperatureSensor for ScriptedSensor {
    fn read_celsius(&mut self, address: u8) -> Result<f32, SensorError> {
        self.addresses.push(address);
        self.readings.pop_front().unwrap_or(Err(SensorError::Bus))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<SinkCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, SinkCall::Telemetry(_)))
            .cloned()
            .collect()
    }

    pub fn telemetry(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Telemetry(t) => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl AlertSink for RecordingSink {
    fn on_over_temperature(&mut self) {
        self.calls.push(SinkCall::Over);
    }

    fn on_safe_conditions(&mut self) {
        self.calls.push(SinkCall::Safe);
    }
}

impl TelemetryReporter for RecordingSink {
    fn on_telemetry(&mut self, celsius: f32) {
        self.calls.push(SinkCall::Telemetry(celsius));
    }
}

// ── ChannelSink ───────────────────────────────────────────────

/// Forwards calls out of the monitor thread.
pub struct ChannelSink(pub Sender<SinkCall>);

impl AlertSink for ChannelSink {
    fn on_over_temperature(&mut self) {
        let _ = self.0.send(SinkCall::Over);
    }

    fn on_safe_conditions(&mut self) {
        let _ = self.0.send(SinkCall::Safe);
    }
}

impl TelemetryReporter for ChannelSink {
    fn on_telemetry(&mut self, celsius: f32) {
        let _ = self.0.send(SinkCall::Telemetry(celsius));
    }
}
