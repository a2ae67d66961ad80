//! Periodic measurement ticker.
//!
//! Pushes a [`MeasureCommand`](ThermalEvent::MeasureCommand) into the
//! manager's queue at a fixed cadence.  Runs in its own task context, so
//! it uses the bounded-wait back insertion and simply skips a tick when
//! the queue stays full (the next tick samples a fresh value anyway).

use std::thread::JoinHandle;

use embassy_time::Duration;
use log::{info, warn};

use crate::error::{Error, Result};
use crate::events::ThermalEvent;
use crate::manager::ThermalManager;

use super::task_pin::{self, Core};

const TICKER_STACK_KB: usize = 2;
const TICKER_PRIORITY: u8 = 1;

/// Queue one measurement request.
pub fn fire(manager: &ThermalManager) -> Result<()> {
    manager.send_back_blocking(ThermalEvent::MeasureCommand)
}

/// Start the ticker thread.  Fires forever every `period`.
pub fn spawn_measure_ticker(
    manager: &'static ThermalManager,
    period: Duration,
) -> Result<JoinHandle<()>> {
    if period.as_ticks() == 0 {
        return Err(Error::Config("measure interval must be non-zero"));
    }
    let sleep = core::time::Duration::from_micros(period.as_micros());
    task_pin::spawn_on_core(
        Core::App,
        TICKER_PRIORITY,
        TICKER_STACK_KB,
        "thermalTick\0",
        move || {
            info!("Measure ticker every {}ms", period.as_millis());
            loop {
                std::thread::sleep(sleep);
                if let Err(e) = fire(manager) {
                    warn!("Measure ticker: command dropped: {}", e);
                }
            }
        },
    )
    .map_err(|_| Error::TaskSpawn)
}
