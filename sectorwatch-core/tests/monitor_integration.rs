//! Integration tests for the full poll-cycle pipeline
//!
//! Drives a [`Monitor`] end to end through scripted weather and advisory
//! sources and a fixed clock, checking the broadcast decisions a real
//! deployment would observe: startup silence, change-triggered scope,
//! extension wording, and degradation when a source goes dark.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};

use sectorwatch_core::{
    config::{CalibrationFallback, MonitorConfig},
    monitor::Monitor,
    notify::{Notification, NotifyMode},
    readings::{Reading, ReferenceObservation},
    sources::{AdvisorySource, SourceError, WeatherSnapshot, WeatherSource},
    time::{Clock, FixedClock, Timestamp},
    zone::Zone,
};

// ============================================================================
// Scripted collaborators
// ============================================================================

#[derive(Clone)]
struct SharedWeather(Rc<RefCell<Result<WeatherSnapshot, SourceError>>>);

impl SharedWeather {
    fn new(initial: Result<WeatherSnapshot, SourceError>) -> Self {
        Self(Rc::new(RefCell::new(initial)))
    }

    fn set(&self, next: Result<WeatherSnapshot, SourceError>) {
        *self.0.borrow_mut() = next;
    }
}

impl WeatherSource for SharedWeather {
    fn observations(&mut self) -> Result<WeatherSnapshot, SourceError> {
        self.0.borrow().clone()
    }
}

#[derive(Clone)]
struct SharedAdvisory(Rc<RefCell<Result<Vec<String>, SourceError>>>);

impl SharedAdvisory {
    fn new(initial: Result<Vec<String>, SourceError>) -> Self {
        Self(Rc::new(RefCell::new(initial)))
    }

    fn set(&self, next: Result<Vec<String>, SourceError>) {
        *self.0.borrow_mut() = next;
    }
}

impl AdvisorySource for SharedAdvisory {
    fn recent_blocks(&mut self) -> Result<Vec<String>, SourceError> {
        self.0.borrow().clone()
    }
}

#[derive(Clone)]
struct SharedClock(Rc<RefCell<FixedClock>>);

impl SharedClock {
    fn new(now: Timestamp) -> Self {
        Self(Rc::new(RefCell::new(FixedClock::new(now))))
    }

    fn set(&self, now: Timestamp) {
        self.0.borrow_mut().set(now);
    }
}

impl Clock for SharedClock {
    fn now(&self) -> Timestamp {
        self.0.borrow().now()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn at(h: u32, m: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
}

fn config() -> MonitorConfig {
    serde_json::from_str(
        r#"{
            "sector": "17",
            "target_station": "S106",
            "fallback_station": "S24",
            "reference_stations": ["S124", "S126", "S130"]
        }"#,
    )
    .unwrap()
}

/// Snapshot whose references calibrate to offset zero, so the estimate is
/// exactly the 0.7/0.2 blend of the target inputs.
fn snapshot(temp: f32, rh: f32) -> WeatherSnapshot {
    let reference = ReferenceObservation {
        station_id: "S124".into(),
        temperature: Some(25.0),
        relative_humidity: Some(60.0),
        actual_heat_index: Some(0.7 * 25.0 + 0.2 * 60.0),
    };
    WeatherSnapshot {
        target: Reading {
            station_id: "S106".into(),
            temperature: Some(temp),
            relative_humidity: Some(rh),
            timestamp: Some(at(10, 0)),
        },
        fallback: Reading::empty("S24"),
        references: vec![reference],
    }
}

fn monitor_with(
    weather: &SharedWeather,
    advisory: &SharedAdvisory,
    clock: &SharedClock,
) -> Monitor<SharedWeather, SharedAdvisory, SharedClock> {
    Monitor::new(config(), weather.clone(), advisory.clone(), clock.clone())
}

// Green: 0.7*30 + 0.2*40 = 29.0; Yellow: 0.7*30 + 0.2*52 = 31.4
const GREEN_INPUTS: (f32, f32) = (30.0, 40.0);
const YELLOW_INPUTS: (f32, f32) = (30.0, 52.0);

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn baseline_then_zone_change_sends_zone_section_only() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    // Cycle 1: first scheduled tick establishes the baseline silently.
    let report = monitor.run_cycle(NotifyMode::Scheduled);
    assert!(report.notification.is_none());
    assert_eq!(report.message, None);
    assert_eq!(monitor.state().last_zone, Some(Zone::Green));
    assert!(monitor.state().has_broadcast_once);

    // Cycle 2: zone moves to Yellow, lightning unchanged.
    weather.set(Ok(snapshot(YELLOW_INPUTS.0, YELLOW_INPUTS.1)));
    clock.set(at(10, 2));
    let report = monitor.run_cycle(NotifyMode::Triggered);

    assert!(report.changes.zone_changed);
    assert!(!report.changes.lightning_changed);
    assert!(matches!(report.notification, Notification::ZoneOnly(_)));

    let text = report.message.unwrap();
    assert!(text.contains("Code Yellow"));
    assert!(!text.contains("LIGHTNING RISK STATUS"));
}

#[test]
fn no_change_triggered_cycle_is_silent() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    monitor.run_cycle(NotifyMode::Scheduled);
    clock.set(at(10, 2));
    let report = monitor.run_cycle(NotifyMode::Triggered);

    assert!(!report.changes.any());
    assert_eq!(report.message, None);
}

#[test]
fn triggered_changes_before_baseline_are_suppressed() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec!["(0930-1100) 17".to_string()]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    // Lightning is genuinely active on the very first cycle, but there is
    // no baseline yet, so nothing may be broadcast.
    let report = monitor.run_cycle(NotifyMode::Triggered);
    assert!(report.notification.is_none());
    assert!(monitor.state().last_lightning.as_ref().unwrap().active);
    assert!(monitor.state().has_broadcast_once);
}

#[test]
fn scheduled_broadcast_carries_both_sections() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec!["(0930-1100) 17".to_string()]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    monitor.run_cycle(NotifyMode::Scheduled);
    clock.set(at(10, 10));
    let report = monitor.run_cycle(NotifyMode::Scheduled);

    assert!(matches!(report.notification, Notification::Both { .. }));
    let text = report.message.unwrap();
    assert!(text.contains("HEAT STRESS STATUS"));
    assert!(text.contains("LIGHTNING RISK STATUS"));
}

#[test]
fn extension_is_broadcast_as_extended() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec!["(1000-1100) 17".to_string()]));
    let clock = SharedClock::new(at(10, 5));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    monitor.run_cycle(NotifyMode::Scheduled); // baseline: active until 11:00

    advisory.set(Ok(vec![
        "(1000-1100) 17".to_string(),
        "Extended: (1000-1200) 17".to_string(),
    ]));
    clock.set(at(10, 7));
    let report = monitor.run_cycle(NotifyMode::Triggered);

    assert!(report.changes.lightning_changed);
    assert!(report.changes.extended);

    let text = report.message.unwrap();
    assert!(text.contains("EXTENDED"));
    assert!(!text.contains("ALERT:"));
}

#[test]
fn advisory_outage_keeps_status_and_expiry_still_fires() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec!["(1000-1100) 17".to_string()]));
    let clock = SharedClock::new(at(10, 5));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    monitor.run_cycle(NotifyMode::Scheduled);
    assert!(monitor.state().last_lightning.as_ref().unwrap().active);

    // Feed goes dark; the stored status stands (stale-but-valid).
    advisory.set(Err(SourceError::Timeout));
    clock.set(at(10, 30));
    let report = monitor.run_cycle(NotifyMode::Triggered);
    assert!(!report.changes.lightning_changed);
    assert!(monitor.state().last_lightning.as_ref().unwrap().active);

    // Still dark, but the window has lapsed: auto-expiry flips it off.
    clock.set(at(11, 0));
    let report = monitor.run_cycle(NotifyMode::Triggered);
    assert!(report.changes.lightning_changed);
    assert!(!monitor.state().last_lightning.as_ref().unwrap().active);

    let text = report.message.unwrap();
    assert!(text.contains("clear"));
}

#[test]
fn weather_outage_skips_zone_but_processes_lightning() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    monitor.run_cycle(NotifyMode::Scheduled);

    weather.set(Err(SourceError::Unavailable));
    advisory.set(Ok(vec!["(1000-1100) 17".to_string()]));
    clock.set(at(10, 2));
    let report = monitor.run_cycle(NotifyMode::Triggered);

    // Zone kept, lightning activation still broadcast.
    assert_eq!(report.estimate, None);
    assert_eq!(monitor.state().last_zone, Some(Zone::Green));
    assert!(report.changes.lightning_changed);
    assert!(matches!(report.notification, Notification::LightningOnly(_)));
}

#[test]
fn non_ascii_digit_block_does_not_kill_the_cycle() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec![
        "(१२३४-1100) 17".to_string(),
        "(1000-1100) 17".to_string(),
    ]));
    let clock = SharedClock::new(at(10, 5));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    // The non-ASCII block is dropped; the rest of the cycle completes.
    let report = monitor.run_cycle(NotifyMode::Scheduled);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.estimate.is_some());
    assert!(monitor.state().last_lightning.as_ref().unwrap().active);
}

#[test]
fn upcoming_window_is_broadcast_as_forecast() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 30));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    monitor.run_cycle(NotifyMode::Scheduled);

    // A window announced ahead of its start is alerted immediately.
    advisory.set(Ok(vec!["(1100-1200) 17".to_string()]));
    clock.set(at(10, 32));
    let report = monitor.run_cycle(NotifyMode::Triggered);

    assert!(report.changes.lightning_changed);
    let text = report.message.unwrap();
    assert!(text.contains("FORECAST"));
    assert!(text.contains("Prepare to head to shelter"));

    // Feed goes dark; the window begins. The status progresses to active
    // without a second alert for the same advisory.
    advisory.set(Err(SourceError::Timeout));
    clock.set(at(11, 5));
    let report = monitor.run_cycle(NotifyMode::Triggered);
    assert!(!report.changes.lightning_changed);

    let stored = monitor.state().last_lightning.as_ref().unwrap();
    assert!(stored.active);
    assert!(!stored.forecast);
}

#[test]
fn corrupt_advisory_blocks_surface_as_warnings() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec![
        "garbage with no window".to_string(),
        "(1000-1100) 17".to_string(),
    ]));
    let clock = SharedClock::new(at(10, 5));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    let report = monitor.run_cycle(NotifyMode::Scheduled);
    assert_eq!(report.warnings.len(), 1);
    // The good block still produced a status.
    assert!(monitor.state().last_lightning.as_ref().unwrap().active);
}

#[test]
fn calibration_outage_reuses_last_offset() {
    // First cycle calibrates to offset +2.0.
    let mut calibrated = snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1);
    calibrated.references[0].actual_heat_index =
        Some(0.7 * 25.0 + 0.2 * 60.0 + 2.0);

    let weather = SharedWeather::new(Ok(calibrated));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    let report = monitor.run_cycle(NotifyMode::Scheduled);
    let first_value = report.estimate.unwrap().value;
    assert!((first_value - (29.0 + 2.0)).abs() < 1e-4);

    // References vanish; ReuseLast keeps the +2.0 correction.
    let mut uncalibrated = snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1);
    uncalibrated.references.clear();
    weather.set(Ok(uncalibrated));
    clock.set(at(10, 2));

    let report = monitor.run_cycle(NotifyMode::Triggered);
    assert!((report.estimate.unwrap().value - first_value).abs() < 1e-4);
}

#[test]
fn calibration_outage_with_zero_policy_drops_offset() {
    let mut cfg = config();
    cfg.calibration_fallback = CalibrationFallback::Zero;

    let mut calibrated = snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1);
    calibrated.references[0].actual_heat_index =
        Some(0.7 * 25.0 + 0.2 * 60.0 + 2.0);

    let weather = SharedWeather::new(Ok(calibrated));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = Monitor::new(cfg, weather.clone(), advisory.clone(), clock.clone());

    monitor.run_cycle(NotifyMode::Scheduled);

    let mut uncalibrated = snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1);
    uncalibrated.references.clear();
    weather.set(Ok(uncalibrated));
    clock.set(at(10, 2));

    let report = monitor.run_cycle(NotifyMode::Triggered);
    assert!((report.estimate.unwrap().value - 29.0).abs() < 1e-4);
}

#[test]
fn fallback_station_substitution_end_to_end() {
    let mut s = snapshot(0.0, 0.0);
    s.target = Reading::empty("S106");
    s.fallback = Reading {
        station_id: "S24".into(),
        temperature: Some(30.0),
        relative_humidity: Some(85.0),
        timestamp: None,
    };

    let weather = SharedWeather::new(Ok(s));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    let report = monitor.run_cycle(NotifyMode::Scheduled);
    let estimate = report.estimate.unwrap();
    assert!(estimate.used_fallback);
    assert!((estimate.value - (0.7 * 30.0 + 0.2 * 85.0)).abs() < 1e-4);
}

#[test]
fn peek_replies_without_moving_the_baseline() {
    let weather = SharedWeather::new(Ok(snapshot(GREEN_INPUTS.0, GREEN_INPUTS.1)));
    let advisory = SharedAdvisory::new(Ok(vec![]));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    monitor.run_cycle(NotifyMode::Scheduled);
    let state_before = monitor.state().clone();

    // On-demand reply sees the new Yellow value...
    weather.set(Ok(snapshot(YELLOW_INPUTS.0, YELLOW_INPUTS.1)));
    clock.set(at(10, 1));
    let reply = monitor.peek().unwrap();
    assert!(reply.contains("Code Yellow"));

    // ...but the tracked baseline is untouched, so the next triggered
    // cycle still detects the change.
    assert_eq!(monitor.state(), &state_before);
    clock.set(at(10, 2));
    let report = monitor.run_cycle(NotifyMode::Triggered);
    assert!(report.changes.zone_changed);
}

#[test]
fn peek_with_everything_dark_returns_nothing() {
    let weather = SharedWeather::new(Err(SourceError::Timeout));
    let advisory = SharedAdvisory::new(Err(SourceError::Timeout));
    let clock = SharedClock::new(at(10, 0));
    let mut monitor = monitor_with(&weather, &advisory, &clock);

    assert_eq!(monitor.peek(), None);
    // A fully dark cycle must not establish the baseline either.
    let report = monitor.run_cycle(NotifyMode::Scheduled);
    assert!(report.notification.is_none());
    assert!(!monitor.state().has_broadcast_once);
}
