//! Thermal manager firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Lm75bd (I2C)            LogSink               OS pin ISR      │
//! │  (TemperatureSensor)     (AlertSink+Telemetry) (os_handler)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  ThermalManager ── EventQueue ──▶ ThermalMonitor       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Measure ticker (MeasureCommand every measure_interval_ms)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{InterruptType, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use log::{info, warn};

use thermalmgr::adapters::log_sink::LogSink;
use thermalmgr::config::ThermalConfig;
use thermalmgr::drivers::ticker;
use thermalmgr::manager::{THERMAL_MANAGER, os_handler};
use thermalmgr::sensors::lm75bd::{Lm75bd, Lm75bdConfig};

/// How often the idle loop re-arms the OS pin interrupt.
const REARM_INTERVAL_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Thermal manager v{}", env!("CARGO_PKG_VERSION"));

    let config = ThermalConfig::default();
    config.validate()?;

    // ── 2. Sensor on I2C0 (SDA=GPIO8, SCL=GPIO9) ──────────────
    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(100.kHz().into()),
    )?;

    let mut sensor = Lm75bd::new(i2c);
    sensor.configure(&Lm75bdConfig {
        address: config.sensor_address,
        over_temp_threshold_c: config.high_threshold_c,
        hysteresis_threshold_c: config.low_threshold_c,
        ..Lm75bdConfig::default()
    })?;

    // ── 3. Queue + monitor task ───────────────────────────────
    let _monitor = THERMAL_MANAGER.start(&config, sensor, LogSink::new())?;

    // ── 4. Producers ──────────────────────────────────────────
    // OS is open-drain, active low, interrupt mode (GPIO4).
    let mut os_pin = PinDriver::input(peripherals.pins.gpio4)?;
    os_pin.set_pull(Pull::Up)?;
    os_pin.set_interrupt_type(InterruptType::NegEdge)?;
    // SAFETY: os_handler runs in ISR context.  It takes one short critical
    // section to insert at the queue head and may bump an atomic counter;
    // it runs no waker and takes no OS lock.  The monitor picks the alarm
    // up within `alarm_poll_ms`.
    unsafe { os_pin.subscribe(os_handler)? };
    os_pin.enable_interrupt()?;

    match config.measure_interval() {
        Some(period) => {
            ticker::spawn_measure_ticker(&THERMAL_MANAGER, period)?;
        }
        None => warn!("Periodic measurement disabled"),
    }

    info!("Thermal manager running");

    // ── 5. Idle loop ──────────────────────────────────────────
    // The HAL disarms a GPIO interrupt after it fires.
    loop {
        os_pin.enable_interrupt()?;
        FreeRtos::delay_ms(REARM_INTERVAL_MS);
    }
}
