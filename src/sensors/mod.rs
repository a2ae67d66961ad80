//! Temperature sensor adapters implementing
//! [`TemperatureSensor`](crate::app::ports::TemperatureSensor).
//!
//! - [`lm75bd`]: the real part, over an `embedded-hal` I2C bus.
//! - [`simulated`]: an injectable value for host runs and tests.

pub mod lm75bd;
pub mod simulated;

pub use lm75bd::{Lm75bd, Lm75bdConfig};
pub use simulated::SimulatedSensor;
