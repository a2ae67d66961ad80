//! Thermal event types.
//!
//! Events are produced by:
//! - the LM75BD OS-pin interrupt handler (`SensorAlarm`)
//! - the periodic measurement ticker or an explicit caller (`MeasureCommand`)
//!
//! Events are consumed by the thermal monitor task, one at a time, through
//! the [`EventQueue`](crate::queue::EventQueue).
//!
//! ```text
//! ┌─────────────┐  front, 0 wait  ┌──────────────┐     ┌──────────────┐
//! │ OS pin ISR  │────────────────▶│              │     │   Thermal    │
//! │             │                 │  Event Queue │────▶│   Monitor    │
//! │ Ticker/cmd  │────────────────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘  back, bounded  └──────────────┘     └──────────────┘
//! ```

/// The two kinds of work the monitor task accepts.  No payload: the sample
/// is always read fresh when the event is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThermalEvent {
    /// The sensor asserted its over-temperature (OS) output.
    SensorAlarm = 0,
    /// Routine sampling request; produces telemetry only.
    MeasureCommand = 1,
}

impl ThermalEvent {
    /// Decode a raw event tag as passed by C-style callers.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::SensorAlarm),
            1 => Some(Self::MeasureCommand),
            _ => None,
        }
    }

    /// Raw tag for this event.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Alarms take the front-priority, non-blocking admission path.
    pub const fn is_alarm(self) -> bool {
        matches!(self, Self::SensorAlarm)
    }
}
