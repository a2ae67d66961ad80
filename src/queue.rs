//! Bounded thermal event queue with asymmetric admission.
//!
//! Two producers with different constraints share one mailbox:
//!
//! - **Interrupt context** inserts [`SensorAlarm`](ThermalEvent::SensorAlarm)
//!   at the *front*, with zero wait.  A full queue rejects the alarm
//!   immediately; nothing here may block an ISR.
//! - **Task context** inserts [`MeasureCommand`](ThermalEvent::MeasureCommand)
//!   at the *back*, waiting a bounded time for a free slot (backpressure).
//!
//! The single consumer ([`ThermalMonitor`](crate::app::service::ThermalMonitor))
//! waits indefinitely in [`EventQueue::receive`].  That wait is the only
//! unbounded blocking point in the system.
//!
//! Every state access is one short critical section through an
//! `embassy-sync` blocking mutex, so an ISR never waits on a lower-priority
//! holder for longer than a handful of instructions.  Blocked parties park
//! their wakers in the state and are woken by the opposite operation, with
//! one exception: a front insert never runs the consumer's waker.  A thread
//! waker takes an OS lock, which interrupt context must not do.  The
//! consumer instead re-checks the queue every `alarm_poll` period, driven by
//! the time driver, and task-context callers may wake it at once with
//! [`EventQueue::wake_receiver`].
//!
//! Storage is reserved at compile time (`N` slots); the effective capacity
//! is chosen at runtime with [`EventQueue::configure`] and never grows.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::waitqueue::{MultiWakerRegistration, WakerRegistration};
use embassy_time::{Duration, with_timeout};
use heapless::Deque;

use crate::error::{Error, Result};
use crate::events::ThermalEvent;

/// Slots reserved for every queue instance.
pub const QUEUE_STORAGE: usize = 16;

/// Longest time a front-inserted alarm waits for an idle consumer.
pub const DEFAULT_ALARM_POLL: Duration = Duration::from_millis(10);

/// Producers that can be parked on a full queue at once.  A further
/// producer evicts (wakes) the parked ones, which then simply re-register.
const MAX_PARKED_SENDERS: usize = 4;

// ── Shared state ──────────────────────────────────────────────

struct QueueState<const N: usize> {
    events: Deque<ThermalEvent, N>,
    capacity: usize,
    alarm_poll: Duration,
    receiver_waker: WakerRegistration,
    sender_wakers: MultiWakerRegistration<MAX_PARKED_SENDERS>,
}

impl<const N: usize> QueueState<N> {
    const fn new() -> Self {
        Self {
            events: Deque::new(),
            capacity: N,
            alarm_poll: DEFAULT_ALARM_POLL,
            receiver_waker: WakerRegistration::new(),
            sender_wakers: MultiWakerRegistration::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    fn push_front(&mut self, event: ThermalEvent) -> Result<()> {
        if self.is_full() {
            return Err(Error::QueueFull);
        }
        self.events.push_front(event).map_err(|_| Error::QueueFull)
    }

    fn push_back(&mut self, event: ThermalEvent) -> Result<()> {
        if self.is_full() {
            return Err(Error::QueueFull);
        }
        self.events.push_back(event).map_err(|_| Error::QueueFull)?;
        self.receiver_waker.wake();
        Ok(())
    }

    fn pop(&mut self) -> Option<ThermalEvent> {
        let event = self.events.pop_front()?;
        // A slot just freed up: let parked back-inserters retry.
        self.sender_wakers.wake();
        Some(event)
    }

    fn poll_push_back(&mut self, event: ThermalEvent, cx: &mut Context<'_>) -> Poll<()> {
        match self.push_back(event) {
            Ok(()) => Poll::Ready(()),
            Err(_) => {
                self.sender_wakers.register(cx.waker());
                Poll::Pending
            }
        }
    }

    fn poll_receive(&mut self, cx: &mut Context<'_>) -> Poll<ThermalEvent> {
        match self.pop() {
            Some(event) => Poll::Ready(event),
            None => {
                self.receiver_waker.register(cx.waker());
                Poll::Pending
            }
        }
    }
}

// ── EventQueue ────────────────────────────────────────────────

/// Bounded MPSC mailbox of [`ThermalEvent`]s.
pub struct EventQueue<M: RawMutex, const N: usize> {
    state: Mutex<M, RefCell<QueueState<N>>>,
}

impl<M: RawMutex, const N: usize> EventQueue<M, N> {
    /// An empty queue using all `N` slots.  `const` so it can live in a
    /// `static` next to the interrupt handler that feeds it.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(QueueState::new())),
        }
    }

    /// An empty queue limited to `capacity` of its `N` slots.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let queue = Self::new();
        queue.configure(capacity)?;
        Ok(queue)
    }

    /// Change the effective capacity.  Must be in `1..=N` and not below
    /// the number of events currently queued.
    pub fn configure(&self, capacity: usize) -> Result<()> {
        if capacity == 0 || capacity > N {
            return Err(Error::Config("queue capacity out of range"));
        }
        self.lock(|s| {
            if s.events.len() > capacity {
                return Err(Error::InvalidState);
            }
            s.capacity = capacity;
            Ok(())
        })
    }

    fn lock<R>(&self, f: impl FnOnce(&mut QueueState<N>) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    // ── Producers ─────────────────────────────────────────────

    /// Insert at the head without waiting.  Interrupt-safe: touches only
    /// the critical-section guarded state and runs no waker.
    ///
    /// The event becomes the next one received, ahead of any backlog.  An
    /// idle consumer picks it up within the alarm poll period.  Several
    /// alarms inserted before the consumer runs come out in reverse order;
    /// alarms carry no payload, so this is harmless.
    pub fn try_send_front(&self, event: ThermalEvent) -> Result<()> {
        self.lock(|s| s.push_front(event))
    }

    /// Wake a parked consumer now.  Task context only.
    pub fn wake_receiver(&self) {
        self.lock(|s| s.receiver_waker.wake());
    }

    /// Insert at the tail without waiting.
    pub fn try_send_back(&self, event: ThermalEvent) -> Result<()> {
        self.lock(|s| s.push_back(event))
    }

    /// Insert at the tail, waiting up to `timeout` for a free slot.
    ///
    /// Task context only.  On timeout the event is not queued and
    /// [`Error::InsertionTimeout`] is returned.
    pub async fn send_back_with_timeout(&self, event: ThermalEvent, timeout: Duration) -> Result<()> {
        if timeout.as_ticks() == 0 {
            return self.try_send_back(event);
        }
        with_timeout(timeout, poll_fn(|cx| self.lock(|s| s.poll_push_back(event, cx))))
            .await
            .map_err(|_| Error::InsertionTimeout)
    }

    /// Blocking form of [`send_back_with_timeout`](Self::send_back_with_timeout)
    /// for plain thread contexts.
    pub fn send_back_blocking(&self, event: ThermalEvent, timeout: Duration) -> Result<()> {
        futures_lite::future::block_on(self.send_back_with_timeout(event, timeout))
    }

    // ── Consumer ──────────────────────────────────────────────

    /// Wait until an event is available and take it.
    ///
    /// Never gives up; the wait is re-armed every alarm poll period so
    /// front inserts made from interrupt context are seen without a wake.
    pub async fn receive(&self) -> ThermalEvent {
        loop {
            let period = self.alarm_poll();
            let polled = with_timeout(period, poll_fn(|cx| self.lock(|s| s.poll_receive(cx))));
            if let Ok(event) = polled.await {
                return event;
            }
        }
    }

    /// Blocking form of [`receive`](Self::receive).
    pub fn receive_blocking(&self) -> ThermalEvent {
        futures_lite::future::block_on(self.receive())
    }

    /// Take the next event if one is queued.
    pub fn try_receive(&self) -> Option<ThermalEvent> {
        self.lock(QueueState::pop)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.lock(|s| s.events.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.lock(|s| s.is_full())
    }

    /// Effective capacity.
    pub fn capacity(&self) -> usize {
        self.lock(|s| s.capacity)
    }

    pub fn alarm_poll(&self) -> Duration {
        self.lock(|s| s.alarm_poll)
    }

    /// Change how often an idle consumer re-checks for front inserts.
    pub fn set_alarm_poll(&self, period: Duration) -> Result<()> {
        if period.as_ticks() == 0 {
            return Err(Error::Config("alarm poll period must be non-zero"));
        }
        self.lock(|s| s.alarm_poll = period);
        Ok(())
    }
}

impl<M: RawMutex, const N: usize> Default for EventQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
