//! Unified error types for the thermal manager.
//!
//! `Error` covers the send path, task start-up and configuration loading.
//! Sensor failures stay inside the monitor loop as [`SensorError`] and are
//! never surfaced to senders.  All variants are `Copy` so they can be
//! returned from interrupt context and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The caller supplied no event, or an unknown raw event tag.
    InvalidArgument,
    /// The queue has not been opened yet, or was already opened.
    InvalidState,
    /// Zero-wait insertion found the queue at capacity.
    QueueFull,
    /// Bounded-wait insertion gave up before a slot became free.
    InsertionTimeout,
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
    /// The monitor task could not be created.
    TaskSpawn,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::InvalidState => write!(f, "invalid state"),
            Self::QueueFull => write!(f, "event queue full"),
            Self::InsertionTimeout => write!(f, "event queue insertion timed out"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::TaskSpawn => write!(f, "monitor task spawn failed"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The I2C transaction failed (NACK, arbitration loss, bus fault).
    Bus,
    /// The sensor is shut down or has not been configured.
    NotReady,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::NotReady => write!(f, "sensor not ready"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl core::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
