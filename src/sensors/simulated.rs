//! Simulated temperature source for host runs and tests.
//!
//! The reading lives in a static atomic so a test, a console command or an
//! "ISR" thread can inject values while the monitor task owns the sensor.
//! A NaN bit pattern stands for "next reads fail".

use core::sync::atomic::{AtomicU32, Ordering};

use crate::app::ports::TemperatureSensor;
use crate::error::SensorError;

/// 25.0 °C.
const ROOM_TEMP_BITS: u32 = 0x41C8_0000;

static SIM_CELSIUS_BITS: AtomicU32 = AtomicU32::new(ROOM_TEMP_BITS);

/// Set the value every [`SimulatedSensor`] reads from now on.
pub fn sim_set_celsius(celsius: f32) {
    SIM_CELSIUS_BITS.store(celsius.to_bits(), Ordering::Relaxed);
}

/// Make subsequent reads fail with [`SensorError::Bus`].
pub fn sim_fail_reads() {
    SIM_CELSIUS_BITS.store(f32::NAN.to_bits(), Ordering::Relaxed);
}

/// Sensor backed by the process-wide injected value.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedSensor;

impl SimulatedSensor {
    pub fn new() -> Self {
        Self
    }
}

impl TemperatureSensor for SimulatedSensor {
    fn read_celsius(&mut self, _address: u8) -> Result<f32, SensorError> {
        let celsius = f32::from_bits(SIM_CELSIUS_BITS.load(Ordering::Relaxed));
        if celsius.is_nan() {
            return Err(SensorError::Bus);
        }
        Ok(celsius)
    }
}
