//! NXP LM75BD digital temperature sensor (I2C).
//!
//! Register map:
//!
//! | Ptr  | Register | Width | Format                                  |
//! |------|----------|-------|-----------------------------------------|
//! | 0x00 | Temp     | 16    | 11-bit two's complement, 0.125 °C / LSB |
//! | 0x01 | Conf     | 8     | shutdown, OS mode, OS polarity, fault Q |
//! | 0x02 | Thyst    | 16    | 9-bit two's complement, 0.5 °C / LSB    |
//! | 0x03 | Tos      | 16    | 9-bit two's complement, 0.5 °C / LSB    |
//!
//! All 16-bit registers are MSB first, left aligned.  In interrupt mode the
//! OS output asserts when the temperature crosses Tos upward and again when
//! it falls below Thyst; either edge is a `SensorAlarm`.

use embedded_hal::i2c::I2c;
use log::info;

use crate::app::ports::TemperatureSensor;
use crate::error::SensorError;

const REG_TEMP: u8 = 0x00;
const REG_CONF: u8 = 0x01;
const REG_THYST: u8 = 0x02;
const REG_TOS: u8 = 0x03;

const CONF_SHUTDOWN: u8 = 1 << 0;
const CONF_OS_INTERRUPT: u8 = 1 << 1;
const CONF_OS_ACTIVE_HIGH: u8 = 1 << 2;
const CONF_FAULT_QUEUE_SHIFT: u8 = 3;

/// Measurement range from the datasheet.
const MIN_C: f32 = -55.0;
const MAX_C: f32 = 125.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsMode {
    Comparator,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsPolarity {
    ActiveLow,
    ActiveHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    Normal,
    Shutdown,
}

/// Consecutive faults required before OS asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultQueue {
    One = 0b00,
    Two = 0b01,
    Four = 0b10,
    Six = 0b11,
}

/// Device setup written by [`Lm75bd::configure`].
#[derive(Debug, Clone, Copy)]
pub struct Lm75bdConfig {
    pub address: u8,
    pub fault_queue: FaultQueue,
    pub os_polarity: OsPolarity,
    pub os_mode: OsMode,
    pub device_mode: DeviceMode,
    pub over_temp_threshold_c: f32,
    pub hysteresis_threshold_c: f32,
}

impl Default for Lm75bdConfig {
    fn default() -> Self {
        Self {
            address: crate::config::LM75BD_OBC_I2C_ADDR,
            fault_queue: FaultQueue::One,
            os_polarity: OsPolarity::ActiveLow,
            os_mode: OsMode::Interrupt,
            device_mode: DeviceMode::Normal,
            over_temp_threshold_c: 80.0,
            hysteresis_threshold_c: 75.0,
        }
    }
}

impl Lm75bdConfig {
    /// Configuration register byte.
    pub fn conf_byte(&self) -> u8 {
        let mut conf = (self.fault_queue as u8) << CONF_FAULT_QUEUE_SHIFT;
        if self.device_mode == DeviceMode::Shutdown {
            conf |= CONF_SHUTDOWN;
        }
        if self.os_mode == OsMode::Interrupt {
            conf |= CONF_OS_INTERRUPT;
        }
        if self.os_polarity == OsPolarity::ActiveHigh {
            conf |= CONF_OS_ACTIVE_HIGH;
        }
        conf
    }
}

/// Decode the temperature register.
pub fn decode_temperature(msb: u8, lsb: u8) -> f32 {
    let raw = i16::from_be_bytes([msb, lsb]) >> 5;
    f32::from(raw) * 0.125
}

/// Encode a Tos/Thyst limit, rounded to the nearest 0.5 °C.
pub fn encode_limit(celsius: f32) -> Result<[u8; 2], SensorError> {
    if !(MIN_C..=MAX_C).contains(&celsius) {
        return Err(SensorError::OutOfRange);
    }
    let half_degrees = (celsius * 2.0).round() as i16;
    Ok((half_degrees << 7).to_be_bytes())
}

/// LM75BD driver over any `embedded-hal` 1.0 I2C bus.
pub struct Lm75bd<I2C> {
    i2c: I2C,
    shutdown: bool,
}

impl<I2C: I2c> Lm75bd<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            shutdown: false,
        }
    }

    /// Write the configuration and both OS limits.
    pub fn configure(&mut self, config: &Lm75bdConfig) -> Result<(), SensorError> {
        if config.hysteresis_threshold_c >= config.over_temp_threshold_c {
            return Err(SensorError::OutOfRange);
        }
        let tos = encode_limit(config.over_temp_threshold_c)?;
        let thyst = encode_limit(config.hysteresis_threshold_c)?;
        let addr = config.address;

        self.write(addr, &[REG_CONF, config.conf_byte()])?;
        self.write(addr, &[REG_THYST, thyst[0], thyst[1]])?;
        self.write(addr, &[REG_TOS, tos[0], tos[1]])?;
        self.shutdown = config.device_mode == DeviceMode::Shutdown;

        info!(
            "LM75BD@0x{:02X}: Tos={:.1}\u{00b0}C Thyst={:.1}\u{00b0}C conf=0x{:02X}",
            addr,
            config.over_temp_threshold_c,
            config.hysteresis_threshold_c,
            config.conf_byte()
        );
        Ok(())
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), SensorError> {
        self.i2c.write(address, bytes).map_err(|_| SensorError::Bus)
    }
}

impl<I2C: I2c> TemperatureSensor for Lm75bd<I2C> {
    fn read_celsius(&mut self, address: u8) -> Result<f32, SensorError> {
        if self.shutdown {
            return Err(SensorError::NotReady);
        }
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(address, &[REG_TEMP], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(decode_temperature(buf[0], buf[1]))
    }
}
