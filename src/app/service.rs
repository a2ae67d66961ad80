//! Thermal monitor: the single consumer of the event queue.
//!
//! [`ThermalMonitor`] owns the sensor and the output sink and borrows the
//! queue.  Each received event runs one cycle:
//!
//! ```text
//!  EventQueue ──▶ receive ──▶ read sensor ──▶ (alarm?) hysteresis ──▶ AlertSink
//!                                   │
//!                                   └──────────▶ TelemetryReporter
//! ```
//!
//! The sample is read fresh for every event and never cached.  Only
//! `SensorAlarm` events pass through the threshold rule; `MeasureCommand`
//! events produce telemetry only.  A failed read skips the whole cycle
//! rather than reporting a made-up value.

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{debug, info, warn};

use crate::config::ThermalConfig;
use crate::error::{Result, SensorError};
use crate::events::ThermalEvent;
use crate::queue::EventQueue;
use crate::thresholds::{Alert, AlertFilter, Thresholds};

use super::ports::{AlertSink, TelemetryReporter, TemperatureSensor};

/// What one processed event produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// A sample was read and emitted as telemetry.  `alert` is the
    /// notification fired for it, if any.
    Sampled { celsius: f32, alert: Option<Alert> },
    /// The sensor read failed; nothing was emitted.
    ReadFailed(SensorError),
}

/// Running counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub events: u64,
    pub alarms: u64,
    pub measurements: u64,
    pub over_temperature: u64,
    pub safe_conditions: u64,
    /// Alerts dropped by edge-mode filtering.
    pub suppressed: u64,
    pub read_failures: u64,
}

// ───────────────────────────────────────────────────────────────
// ThermalMonitor
// ───────────────────────────────────────────────────────────────

pub struct ThermalMonitor<'q, M: RawMutex, const N: usize, S, O> {
    queue: &'q EventQueue<M, N>,
    sensor: S,
    sink: O,
    sensor_address: u8,
    thresholds: Thresholds,
    filter: AlertFilter,
    stats: MonitorStats,
}

impl<'q, M, const N: usize, S, O> ThermalMonitor<'q, M, N, S, O>
where
    M: RawMutex,
    S: TemperatureSensor,
    O: AlertSink + TelemetryReporter,
{
    pub fn new(
        queue: &'q EventQueue<M, N>,
        sensor: S,
        sink: O,
        config: &ThermalConfig,
    ) -> Result<Self> {
        Ok(Self {
            queue,
            sensor,
            sink,
            sensor_address: config.sensor_address,
            thresholds: config.thresholds()?,
            filter: AlertFilter::new(config.alert_mode),
            stats: MonitorStats::default(),
        })
    }

    // ── Loop ──────────────────────────────────────────────────

    /// Run forever.  Never returns; no error terminates the loop.
    pub async fn run(mut self) {
        info!(
            "Thermal monitor running (high={:.1}\u{00b0}C low={:.1}\u{00b0}C addr=0x{:02X})",
            self.thresholds.high_c(),
            self.thresholds.low_c(),
            self.sensor_address
        );
        loop {
            self.run_once().await;
        }
    }

    /// Blocking form of [`run`](Self::run), for a dedicated thread.
    pub fn run_blocking(self) {
        futures_lite::future::block_on(self.run());
    }

    /// Wait for the next event and process it.
    pub async fn run_once(&mut self) -> Outcome {
        let event = self.queue.receive().await;
        self.process(event)
    }

    /// Blocking form of [`run_once`](Self::run_once).
    pub fn step_blocking(&mut self) -> Outcome {
        futures_lite::future::block_on(self.run_once())
    }

    // ── One cycle ─────────────────────────────────────────────

    /// Read, evaluate (alarms only), emit.
    pub fn process(&mut self, event: ThermalEvent) -> Outcome {
        self.stats.events += 1;
        match event {
            ThermalEvent::SensorAlarm => self.stats.alarms += 1,
            ThermalEvent::MeasureCommand => self.stats.measurements += 1,
        }

        let celsius = match self.sensor.read_celsius(self.sensor_address) {
            Ok(c) => c,
            Err(e) => {
                self.stats.read_failures += 1;
                warn!("Thermal: sensor read failed on {:?}: {}", event, e);
                return Outcome::ReadFailed(e);
            }
        };
        debug!("Thermal: {:?} sampled {:.3}\u{00b0}C", event, celsius);

        let alert = if event.is_alarm() {
            self.evaluate(celsius)
        } else {
            None
        };

        self.sink.on_telemetry(celsius);
        Outcome::Sampled { celsius, alert }
    }

    fn evaluate(&mut self, celsius: f32) -> Option<Alert> {
        let verdict = self.thresholds.evaluate(celsius)?;
        let Some(alert) = self.filter.admit(verdict) else {
            self.stats.suppressed += 1;
            return None;
        };
        match alert {
            Alert::OverTemperature => {
                self.stats.over_temperature += 1;
                self.sink.on_over_temperature();
            }
            Alert::SafeConditions => {
                self.stats.safe_conditions += 1;
                self.sink.on_safe_conditions();
            }
        }
        Some(alert)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }
}
