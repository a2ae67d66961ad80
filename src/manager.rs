//! Thermal manager: owns the event queue and the send API.
//!
//! The manager is the one context object producers and the monitor share.
//! It starts *closed*: every send fails with [`Error::InvalidState`] until
//! [`ThermalManager::open`] has sized the queue.  [`ThermalManager::start`]
//! opens it and spawns the monitor task; both happen once per process.
//! A start whose task cannot be spawned leaves the manager closed again.
//!
//! ```text
//!  CLOSED ──open──▶ OPENING ──config applied──▶ OPEN
//!     ▲                │                          │
//!     └── bad config ──┘                          │
//!     └────────────── spawn failed ───────────────┘
//! ```
//!
//! A process-wide [`THERMAL_MANAGER`] exists only because the LM75BD
//! interrupt handler takes no arguments; everything else can use its own
//! instance (tests create as many as they like).
//!
//! ```text
//!  os_handler() ── try_send_front ──┐
//!                                   ▼
//!  ticker / caller ── send_back ──▶ ThermalManager.queue ──▶ ThermalMonitor
//! ```

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::io;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Duration;
use log::{error, info};

use crate::app::ports::{AlertSink, TelemetryReporter, TemperatureSensor};
use crate::app::service::ThermalMonitor;
use crate::config::ThermalConfig;
use crate::drivers::task_pin::{self, Core};
use crate::error::{Error, Result};
use crate::events::ThermalEvent;
use crate::queue::{EventQueue, QUEUE_STORAGE};

/// The queue type every manager owns.
pub type ThermalQueue = EventQueue<CriticalSectionRawMutex, QUEUE_STORAGE>;

/// Monitor bound to a manager's queue.
pub type ManagedMonitor<'q, S, O> =
    ThermalMonitor<'q, CriticalSectionRawMutex, QUEUE_STORAGE, S, O>;

/// Instance fed by [`os_handler`].
pub static THERMAL_MANAGER: ThermalManager = ThermalManager::new();

const CLOSED: u8 = 0;
const OPENING: u8 = 1;
const OPEN: u8 = 2;

/// Monitor loop handed to a task spawner.
type MonitorTask = Box<dyn FnOnce() + Send + 'static>;

pub struct ThermalManager {
    queue: ThermalQueue,
    state: AtomicU8,
    /// Back-insertion wait in milliseconds, fixed at open time.
    send_timeout_ms: AtomicU32,
    /// Alarms the interrupt handler could not queue.
    dropped_alarms: AtomicU32,
}

impl ThermalManager {
    pub const fn new() -> Self {
        Self {
            queue: ThermalQueue::new(),
            state: AtomicU8::new(CLOSED),
            send_timeout_ms: AtomicU32::new(0),
            dropped_alarms: AtomicU32::new(0),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate `config`, size the queue and accept sends from now on.
    /// Fails with [`Error::InvalidState`] if already open or opening; only
    /// the caller that claims the manager applies its config.
    pub fn open(&self, config: &ThermalConfig) -> Result<()> {
        config.validate()?;
        self.state
            .compare_exchange(CLOSED, OPENING, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::InvalidState)?;
        if let Err(e) = self.apply(config) {
            self.state.store(CLOSED, Ordering::Release);
            return Err(e);
        }
        self.state.store(OPEN, Ordering::Release);
        info!(
            "Thermal manager open (capacity={}, send timeout={}ms, alarm poll={}ms)",
            config.queue_capacity,
            self.send_timeout().as_millis(),
            config.alarm_poll_ms
        );
        Ok(())
    }

    fn apply(&self, config: &ThermalConfig) -> Result<()> {
        self.queue.configure(config.queue_capacity)?;
        self.queue.set_alarm_poll(config.alarm_poll())?;
        let timeout_ms = config.send_timeout().as_millis();
        self.send_timeout_ms
            .store(u32::try_from(timeout_ms).unwrap_or(u32::MAX), Ordering::Relaxed);
        Ok(())
    }

    /// Build a monitor consuming this manager's queue.
    pub fn monitor<S, O>(
        &self,
        sensor: S,
        sink: O,
        config: &ThermalConfig,
    ) -> Result<ManagedMonitor<'_, S, O>>
    where
        S: TemperatureSensor,
        O: AlertSink + TelemetryReporter,
    {
        ThermalMonitor::new(&self.queue, sensor, sink, config)
    }

    /// Open the manager and spawn the monitor task on the application core.
    pub fn start<S, O>(
        &'static self,
        config: &ThermalConfig,
        sensor: S,
        sink: O,
    ) -> Result<JoinHandle<()>>
    where
        S: TemperatureSensor + Send + 'static,
        O: AlertSink + TelemetryReporter + Send + 'static,
    {
        self.start_with(config, sensor, sink, |task| {
            task_pin::spawn_on_core(
                Core::App,
                config.task_priority,
                config.task_stack_kb,
                "thermalMgr\0",
                task,
            )
        })
    }

    fn start_with<S, O, F>(
        &'static self,
        config: &ThermalConfig,
        sensor: S,
        sink: O,
        spawn: F,
    ) -> Result<JoinHandle<()>>
    where
        S: TemperatureSensor + Send + 'static,
        O: AlertSink + TelemetryReporter + Send + 'static,
        F: FnOnce(MonitorTask) -> io::Result<JoinHandle<()>>,
    {
        let monitor = self.monitor(sensor, sink, config)?;
        self.open(config)?;
        spawn(Box::new(move || monitor.run_blocking())).map_err(|e| {
            error!("Thermal: monitor task spawn failed: {}", e);
            self.close_after_failed_start();
            Error::TaskSpawn
        })
    }

    /// Refuse sends again and discard what slipped in without a consumer.
    fn close_after_failed_start(&self) {
        self.state.store(OPENING, Ordering::Release);
        while self.queue.try_receive().is_some() {}
        self.state.store(CLOSED, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.state.load(Ordering::Acquire) == OPEN
    }

    // ── Send API ──────────────────────────────────────────────

    /// Dispatch on the event kind: alarms go to the front without waiting,
    /// measurement commands to the back with the configured bounded wait.
    ///
    /// Task context only: a queued alarm wakes the monitor immediately.
    /// Interrupt handlers use [`try_send_front`](Self::try_send_front).
    pub fn send_event(&self, event: Option<ThermalEvent>) -> Result<()> {
        let event = event.ok_or(Error::InvalidArgument)?;
        self.ensure_open()?;
        match event {
            ThermalEvent::SensorAlarm => {
                self.queue.try_send_front(event)?;
                self.queue.wake_receiver();
                Ok(())
            }
            ThermalEvent::MeasureCommand => self.queue.send_back_blocking(event, self.send_timeout()),
        }
    }

    /// [`send_event`](Self::send_event) for a raw tag.  Unknown tags are
    /// rejected with [`Error::InvalidArgument`].
    pub fn send_raw(&self, tag: u8) -> Result<()> {
        self.send_event(ThermalEvent::from_u8(tag))
    }

    /// Non-blocking front insertion.  Interrupt-safe; the monitor sees the
    /// event within its alarm poll period.
    pub fn try_send_front(&self, event: ThermalEvent) -> Result<()> {
        self.ensure_open()?;
        self.queue.try_send_front(event)
    }

    /// Back insertion waiting at most the configured timeout.
    pub async fn send_back_with_timeout(&self, event: ThermalEvent) -> Result<()> {
        self.ensure_open()?;
        self.queue
            .send_back_with_timeout(event, self.send_timeout())
            .await
    }

    /// Blocking form of [`send_back_with_timeout`](Self::send_back_with_timeout).
    pub fn send_back_blocking(&self, event: ThermalEvent) -> Result<()> {
        futures_lite::future::block_on(self.send_back_with_timeout(event))
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn queue(&self) -> &ThermalQueue {
        &self.queue
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.send_timeout_ms.load(Ordering::Relaxed)))
    }

    /// Alarms lost in [`os_handler`] since boot.
    pub fn dropped_alarms(&self) -> u32 {
        self.dropped_alarms.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::InvalidState)
        }
    }
}

impl Default for ThermalManager {
    fn default() -> Self {
        Self::new()
    }
}

// ── Interrupt entry point ─────────────────────────────────────

/// LM75BD OS-pin interrupt handler.
///
/// Builds a `SensorAlarm` and performs a single non-blocking front insert
/// on [`THERMAL_MANAGER`].  Touches only atomics and critical-section state;
/// no waker runs here.  All processing happens in the monitor task.  A
/// rejected alarm is only counted; logging is not ISR-safe.
pub fn os_handler() {
    handle_alarm_interrupt(&THERMAL_MANAGER);
}

fn handle_alarm_interrupt(manager: &ThermalManager) {
    if manager.try_send_front(ThermalEvent::SensorAlarm).is_err() {
        manager.dropped_alarms.fetch_add(1, Ordering::Relaxed);
    }
}
