//! Send API and task lifecycle tests.

use std::sync::mpsc;
use std::time::{Duration as StdDuration, Instant};

use thermalmgr::config::ThermalConfig;
use thermalmgr::sensors::simulated::{SimulatedSensor, sim_set_celsius};
use thermalmgr::{Error, ThermalEvent, ThermalManager};

use crate::mock_hw::{ChannelSink, RecordingSink, ScriptedSensor, SinkCall};

const RECV_TIMEOUT: StdDuration = StdDuration::from_secs(5);

fn open_manager(config: &ThermalConfig) -> ThermalManager {
    let m = ThermalManager::new();
    m.open(config).unwrap();
    m
}

// ── Argument and state checks ─────────────────────────────────

#[test]
fn missing_event_is_rejected_before_state_check() {
    let m = ThermalManager::new();
    assert_eq!(m.send_event(None), Err(Error::InvalidArgument));
    let m = open_manager(&ThermalConfig::default());
    assert_eq!(m.send_event(None), Err(Error::InvalidArgument));
    assert!(m.queue().is_empty());
}

#[test]
fn sends_before_open_are_invalid_state() {
    let m = ThermalManager::new();
    assert_eq!(
        m.send_event(Some(ThermalEvent::MeasureCommand)),
        Err(Error::InvalidState)
    );
    assert_eq!(
        m.send_event(Some(ThermalEvent::SensorAlarm)),
        Err(Error::InvalidState)
    );
    assert!(m.queue().is_empty());
}

// ── Full queue ────────────────────────────────────────────────

#[test]
fn alarm_on_full_queue_fails_without_overwriting() {
    let m = open_manager(&ThermalConfig::default());
    for _ in 0..10 {
        m.send_event(Some(ThermalEvent::MeasureCommand)).unwrap();
    }
    assert!(m.queue().is_full());

    assert_eq!(
        m.send_event(Some(ThermalEvent::SensorAlarm)),
        Err(Error::QueueFull)
    );

    let drained: Vec<_> = std::iter::from_fn(|| m.queue().try_receive()).collect();
    assert_eq!(drained, vec![ThermalEvent::MeasureCommand; 10]);
}

#[test]
fn command_on_full_queue_times_out_after_bounded_wait() {
    let config = ThermalConfig {
        queue_capacity: 2,
        send_timeout_ticks: 20,
        ..ThermalConfig::default()
    };
    let m = open_manager(&config);
    m.send_event(Some(ThermalEvent::MeasureCommand)).unwrap();
    m.send_event(Some(ThermalEvent::SensorAlarm)).unwrap();

    let started = Instant::now();
    assert_eq!(
        m.send_event(Some(ThermalEvent::MeasureCommand)),
        Err(Error::InsertionTimeout)
    );
    assert!(started.elapsed() >= StdDuration::from_millis(15));
    assert_eq!(m.queue().len(), 2);
}

#[test]
fn blocked_command_succeeds_once_consumer_drains() {
    static M: ThermalManager = ThermalManager::new();
    M.open(&ThermalConfig {
        queue_capacity: 1,
        send_timeout_ticks: 2000,
        ..ThermalConfig::default()
    })
    .unwrap();
    M.send_event(Some(ThermalEvent::MeasureCommand)).unwrap();

    let producer = std::thread::spawn(|| M.send_event(Some(ThermalEvent::MeasureCommand)));
    std::thread::sleep(StdDuration::from_millis(20));
    assert_eq!(M.queue().try_receive(), Some(ThermalEvent::MeasureCommand));

    assert_eq!(producer.join().unwrap(), Ok(()));
    assert_eq!(M.queue().try_receive(), Some(ThermalEvent::MeasureCommand));
}

// ── Monitor task ──────────────────────────────────────────────

#[test]
fn started_monitor_processes_alarms_end_to_end() {
    static M: ThermalManager = ThermalManager::new();
    let (tx, rx) = mpsc::channel();
    let config = ThermalConfig {
        measure_interval_ms: 0,
        ..ThermalConfig::default()
    };

    let _task = M
        .start(&config, SimulatedSensor::new(), ChannelSink(tx))
        .unwrap();
    assert!(M.is_open());

    sim_set_celsius(90.0);
    M.send_event(Some(ThermalEvent::SensorAlarm)).unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(SinkCall::Over));
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(SinkCall::Telemetry(90.0)));

    sim_set_celsius(70.0);
    M.send_event(Some(ThermalEvent::SensorAlarm)).unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(SinkCall::Safe));
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(SinkCall::Telemetry(70.0)));

    M.send_event(Some(ThermalEvent::MeasureCommand)).unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(SinkCall::Telemetry(70.0)));

    // Interrupt path: no wake, picked up by the monitor's alarm poll.
    sim_set_celsius(95.0);
    M.try_send_front(ThermalEvent::SensorAlarm).unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(SinkCall::Over));
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(SinkCall::Telemetry(95.0)));
}

#[test]
fn second_start_is_invalid_state() {
    static M: ThermalManager = ThermalManager::new();
    let config = ThermalConfig::default();
    let (tx, _rx) = mpsc::channel();
    let _task = M
        .start(&config, ScriptedSensor::new(&[]), ChannelSink(tx))
        .unwrap();

    assert_eq!(
        M.start(&config, ScriptedSensor::new(&[]), RecordingSink::new())
            .err(),
        Some(Error::InvalidState)
    );
}
