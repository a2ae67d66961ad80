//! Monitor loop tests: queue → sensor → hysteresis → sinks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use thermalmgr::app::service::{Outcome, ThermalMonitor};
use thermalmgr::config::{AlertMode, LM75BD_OBC_I2C_ADDR, ThermalConfig};
use thermalmgr::queue::{EventQueue, QUEUE_STORAGE};
use thermalmgr::thresholds::Alert;
use thermalmgr::{SensorError, ThermalEvent};

use crate::mock_hw::{RecordingSink, ScriptedSensor, SinkCall};

type Queue = EventQueue<CriticalSectionRawMutex, QUEUE_STORAGE>;

fn queue() -> Queue {
    Queue::with_capacity(10).unwrap()
}

fn monitor<'q>(
    q: &'q Queue,
    readings: &[f32],
    config: &ThermalConfig,
) -> ThermalMonitor<'q, CriticalSectionRawMutex, QUEUE_STORAGE, ScriptedSensor, RecordingSink> {
    ThermalMonitor::new(q, ScriptedSensor::new(readings), RecordingSink::new(), config).unwrap()
}

// ── Hysteresis through the full loop ──────────────────────────

#[test]
fn alarm_sequence_follows_hysteresis() {
    let q = queue();
    let config = ThermalConfig::default();
    let mut m = monitor(&q, &[90.0, 72.0, 77.0, 81.0], &config);

    for _ in 0..4 {
        q.try_send_front(ThermalEvent::SensorAlarm).unwrap();
        m.step_blocking();
    }

    assert_eq!(
        m.sink().calls,
        vec![
            SinkCall::Over,
            SinkCall::Telemetry(90.0),
            SinkCall::Safe,
            SinkCall::Telemetry(72.0),
            SinkCall::Telemetry(77.0),
            SinkCall::Over,
            SinkCall::Telemetry(81.0),
        ]
    );
}

#[test]
fn repeated_high_alarms_alert_every_time_in_level_mode() {
    let q = queue();
    let mut m = monitor(&q, &[85.0, 86.0], &ThermalConfig::default());

    m.process(ThermalEvent::SensorAlarm);
    m.process(ThermalEvent::SensorAlarm);

    assert_eq!(m.sink().alerts(), vec![SinkCall::Over, SinkCall::Over]);
    assert_eq!(m.stats().over_temperature, 2);
}

#[test]
fn edge_mode_reports_only_transitions() {
    let q = queue();
    let config = ThermalConfig {
        alert_mode: AlertMode::Edge,
        ..ThermalConfig::default()
    };
    let mut m = monitor(&q, &[85.0, 86.0, 70.0, 60.0, 90.0], &config);

    for _ in 0..5 {
        m.process(ThermalEvent::SensorAlarm);
    }

    assert_eq!(
        m.sink().alerts(),
        vec![SinkCall::Over, SinkCall::Safe, SinkCall::Over]
    );
    assert_eq!(m.stats().suppressed, 2);
    assert_eq!(m.sink().telemetry().len(), 5);
}

#[test]
fn thresholds_are_inclusive() {
    let q = queue();
    let mut m = monitor(&q, &[80.0, 75.0], &ThermalConfig::default());

    assert_eq!(
        m.process(ThermalEvent::SensorAlarm),
        Outcome::Sampled {
            celsius: 80.0,
            alert: Some(Alert::OverTemperature)
        }
    );
    assert_eq!(
        m.process(ThermalEvent::SensorAlarm),
        Outcome::Sampled {
            celsius: 75.0,
            alert: Some(Alert::SafeConditions)
        }
    );
}

#[test]
fn measure_command_never_alerts() {
    let q = queue();
    let mut m = monitor(&q, &[95.0, 20.0], &ThermalConfig::default());

    m.process(ThermalEvent::MeasureCommand);
    m.process(ThermalEvent::MeasureCommand);

    assert_eq!(
        m.sink().calls,
        vec![SinkCall::Telemetry(95.0), SinkCall::Telemetry(20.0)]
    );
    assert_eq!(m.stats().measurements, 2);
}

#[test]
fn read_failure_emits_nothing() {
    let q = queue();
    let mut m = monitor(&q, &[], &ThermalConfig::default());
    m.sensor_mut().push_failure(SensorError::Bus);
    m.sensor_mut().push_reading(82.0);

    assert_eq!(
        m.process(ThermalEvent::SensorAlarm),
        Outcome::ReadFailed(SensorError::Bus)
    );
    assert!(m.sink().calls.is_empty());

    // The loop carries on with the next event.
    m.process(ThermalEvent::SensorAlarm);
    assert_eq!(m.sink().alerts(), vec![SinkCall::Over]);
    assert_eq!(m.stats().read_failures, 1);
    assert_eq!(m.stats().events, 2);
}

#[test]
fn sensor_read_uses_configured_address() {
    let q = queue();
    let config = ThermalConfig {
        sensor_address: 0x48,
        ..ThermalConfig::default()
    };
    let mut m = monitor(&q, &[30.0], &config);
    m.process(ThermalEvent::MeasureCommand);
    assert_eq!(m.sensor_mut().addresses, vec![0x48]);

    let mut m = monitor(&q, &[30.0], &ThermalConfig::default());
    m.process(ThermalEvent::MeasureCommand);
    assert_eq!(m.sensor_mut().addresses, vec![LM75BD_OBC_I2C_ADDR]);
}

// ── Queue ordering as seen by the consumer ────────────────────

#[test]
fn alarm_overtakes_queued_commands() {
    let q = queue();
    let mut m = monitor(&q, &[88.0, 88.0, 88.0], &ThermalConfig::default());

    q.try_send_back(ThermalEvent::MeasureCommand).unwrap();
    q.try_send_back(ThermalEvent::MeasureCommand).unwrap();
    q.try_send_front(ThermalEvent::SensorAlarm).unwrap();

    let outcomes: Vec<_> = (0..3).map(|_| m.step_blocking()).collect();
    assert!(matches!(
        outcomes[0],
        Outcome::Sampled {
            alert: Some(Alert::OverTemperature),
            ..
        }
    ));
    assert!(matches!(outcomes[1], Outcome::Sampled { alert: None, .. }));
    assert!(matches!(outcomes[2], Outcome::Sampled { alert: None, .. }));
    assert_eq!(m.stats().alarms, 1);
    assert_eq!(m.stats().measurements, 2);
}

#[test]
fn invalid_thresholds_refuse_to_build_monitor() {
    let q = queue();
    let config = ThermalConfig {
        high_threshold_c: 70.0,
        low_threshold_c: 75.0,
        ..ThermalConfig::default()
    };
    assert!(
        ThermalMonitor::new(&q, ScriptedSensor::new(&[]), RecordingSink::new(), &config).is_err()
    );
}
