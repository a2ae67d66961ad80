//! Hysteresis threshold rule.
//!
//! Two thresholds split the temperature axis into three regions:
//!
//! ```text
//!   safe (alert)  │     dead band     │  over-temperature (alert)
//! ────────────────┼───────────────────┼─────────────────────────▶ °C
//!               low                 high
//! ```
//!
//! [`Thresholds::evaluate`] is stateless: the same sample always yields the
//! same verdict, so consecutive alarms above `high` each report
//! over-temperature (level-triggered).  Edge suppression, when configured,
//! is layered on top by [`AlertFilter`].

use crate::config::AlertMode;
use crate::error::{Error, Result};

/// Outbound alert produced by a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// Sample at or above the high threshold.
    OverTemperature,
    /// Sample at or below the low threshold.
    SafeConditions,
}

/// High/low threshold pair with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    high_c: f32,
    low_c: f32,
}

impl Thresholds {
    /// Reference pair: alert at 80 °C, clear at 75 °C.
    pub const DEFAULT: Self = Self {
        high_c: 80.0,
        low_c: 75.0,
    };

    pub fn new(high_c: f32, low_c: f32) -> Result<Self> {
        if !high_c.is_finite() || !low_c.is_finite() {
            return Err(Error::Config("thresholds must be finite"));
        }
        if low_c >= high_c {
            return Err(Error::Config("low threshold must be below high threshold"));
        }
        Ok(Self { high_c, low_c })
    }

    pub fn high_c(&self) -> f32 {
        self.high_c
    }

    pub fn low_c(&self) -> f32 {
        self.low_c
    }

    /// Classify one sample.  `None` inside the dead band.
    pub fn evaluate(&self, celsius: f32) -> Option<Alert> {
        if celsius >= self.high_c {
            Some(Alert::OverTemperature)
        } else if celsius <= self.low_c {
            Some(Alert::SafeConditions)
        } else {
            None
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Decides whether an evaluated alert is reported.
///
/// In [`AlertMode::Level`] every alert passes.  In [`AlertMode::Edge`] the
/// last reported alert is remembered and a repeat is dropped; dead-band
/// samples leave the memory untouched.
#[derive(Debug, Clone, Copy)]
pub struct AlertFilter {
    mode: AlertMode,
    last_reported: Option<Alert>,
}

impl AlertFilter {
    pub fn new(mode: AlertMode) -> Self {
        Self {
            mode,
            last_reported: None,
        }
    }

    /// Returns the alert to report, if any.
    pub fn admit(&mut self, alert: Alert) -> Option<Alert> {
        match self.mode {
            AlertMode::Level => Some(alert),
            AlertMode::Edge => {
                if self.last_reported == Some(alert) {
                    return None;
                }
                self.last_reported = Some(alert);
                Some(alert)
            }
        }
    }

    /// Last alert reported in edge mode.
    pub fn last_reported(&self) -> Option<Alert> {
        self.last_reported
    }
}
