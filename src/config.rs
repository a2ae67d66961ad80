//! Thermal manager configuration parameters
//!
//! All tunable parameters for the thermal manager.  Defaults match the
//! reference sizing; a deployment can override them from JSON.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::queue::QUEUE_STORAGE;
use crate::thresholds::Thresholds;

/// Default 7-bit I2C address of the on-board-computer LM75BD.
pub const LM75BD_OBC_I2C_ADDR: u8 = 0x4F;

/// How repeated threshold observations are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertMode {
    /// Every qualifying alarm re-fires its alert.
    #[default]
    Level,
    /// An alert identical to the last one reported is suppressed.
    Edge,
}

/// Core thermal manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    // --- Sensor ---
    /// 7-bit I2C address of the temperature sensor
    pub sensor_address: u8,

    // --- Thresholds ---
    /// Temperature (Celsius) at or above which over-temperature is reported
    pub high_threshold_c: f32,
    /// Temperature (Celsius) at or below which safe conditions are reported
    pub low_threshold_c: f32,
    /// Level- or edge-triggered alert reporting
    pub alert_mode: AlertMode,

    // --- Queue ---
    /// Effective event queue capacity
    pub queue_capacity: usize,
    /// Back-insertion wait, in scheduler ticks
    pub send_timeout_ticks: u32,
    /// Length of one scheduler tick (milliseconds)
    pub tick_ms: u32,
    /// Longest wait before an idle monitor sees an interrupt alarm (milliseconds)
    pub alarm_poll_ms: u32,

    // --- Monitor task ---
    /// Stack reserved for the monitor task (KiB)
    pub task_stack_kb: usize,
    /// Monitor task priority
    pub task_priority: u8,

    // --- Timing ---
    /// Periodic measurement interval (milliseconds, 0 = disabled)
    pub measure_interval_ms: u32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            // Sensor
            sensor_address: LM75BD_OBC_I2C_ADDR,

            // Thresholds
            high_threshold_c: 80.0,
            low_threshold_c: 75.0,
            alert_mode: AlertMode::Level,

            // Queue
            queue_capacity: 10,
            send_timeout_ticks: 10,
            tick_ms: 1,
            alarm_poll_ms: 10,

            // Monitor task
            task_stack_kb: 4,
            task_priority: 1,

            // Timing
            measure_interval_ms: 1000, // 1 Hz
        }
    }
}

impl ThermalConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.thresholds()?;
        if self.queue_capacity == 0 || self.queue_capacity > QUEUE_STORAGE {
            return Err(Error::Config("queue capacity out of range"));
        }
        if self.sensor_address > 0x7F {
            return Err(Error::Config("sensor address is not a 7-bit I2C address"));
        }
        if self.tick_ms == 0 {
            return Err(Error::Config("tick length must be non-zero"));
        }
        if self.alarm_poll_ms == 0 {
            return Err(Error::Config("alarm poll period must be non-zero"));
        }
        if self.task_stack_kb == 0 {
            return Err(Error::Config("task stack must be non-zero"));
        }
        Ok(())
    }

    /// The hysteresis pair described by this config.
    pub fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::new(self.high_threshold_c, self.low_threshold_c)
    }

    /// Re-check period for alarms queued from interrupt context.
    pub fn alarm_poll(&self) -> Duration {
        Duration::from_millis(u64::from(self.alarm_poll_ms))
    }

    /// Bounded wait applied to back insertions.
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.send_timeout_ticks) * u64::from(self.tick_ms))
    }

    /// Periodic measurement interval, `None` when disabled.
    pub fn measure_interval(&self) -> Option<Duration> {
        (self.measure_interval_ms > 0).then(|| Duration::from_millis(u64::from(self.measure_interval_ms)))
    }
}
