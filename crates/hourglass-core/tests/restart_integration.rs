//! Restart tests.
//!
//! Each test builds an engine, drives it, drops it, and rebuilds a second
//! engine from the same store at a later instant. The rebuilt state must be
//! what uninterrupted operation would have produced.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone};
use hourglass_core::storage::{JsonFileStore, MemoryStore, PersistedState, StateStore};
use hourglass_core::{ProgressEngine, TimerKind, TimerStatus};

// ============================================================================
// Test Helpers
// ============================================================================

fn tz() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn t0() -> DateTime<FixedOffset> {
    tz().with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
}

// ============================================================================
// Countdown
// ============================================================================

#[test]
fn countdown_resumes_paused_at_persisted_remaining() {
    let store = MemoryStore::new();
    {
        let mut engine = ProgressEngine::open(&store, &t0());
        engine.configure_countdown(3600, &t0());
        engine.start(TimerKind::Countdown, &t0()).unwrap();
        engine.pause(TimerKind::Countdown, &(t0() + Duration::minutes(10))).unwrap();
    }

    let later = t0() + Duration::hours(3);
    let mut engine = ProgressEngine::open(&store, &later);
    let timer = engine.timer(TimerKind::Countdown);
    assert_eq!(timer.status(), TimerStatus::Paused);
    assert_eq!(timer.remaining_ms(), 50 * 60 * 1000);

    // Time spent shut down does not count.
    let snap = engine.snapshot(&(later + Duration::minutes(5))).unwrap();
    assert_eq!(snap.countdown.unwrap().remaining_ms, 50 * 60 * 1000);

    engine.start(TimerKind::Countdown, &later).unwrap();
    let snap = engine.snapshot(&(later + Duration::minutes(50))).unwrap();
    let countdown = snap.countdown.unwrap();
    assert!(countdown.done);
    assert_eq!(countdown.status, TimerStatus::Done);
    assert_eq!(countdown.remaining_ms, 0);
}

#[test]
fn running_countdown_survives_restart_through_checkpoint() {
    let store = MemoryStore::new();
    {
        let mut engine = ProgressEngine::open(&store, &t0());
        engine.configure_countdown(600, &t0());
        engine.start(TimerKind::Countdown, &t0()).unwrap();
        assert!(engine.checkpoint(&(t0() + Duration::seconds(95))));
    }

    let record = store.saved().unwrap().countdown_timer.unwrap();
    assert_eq!(record.remaining_seconds, 505);

    let engine = ProgressEngine::open(&store, &(t0() + Duration::minutes(30)));
    assert_eq!(engine.timer(TimerKind::Countdown).remaining_ms(), 505_000);
}

#[test]
fn finished_countdown_stays_done_after_restart() {
    let store = MemoryStore::new();
    {
        let mut engine = ProgressEngine::open(&store, &t0());
        engine.configure_countdown(30, &t0());
        engine.start(TimerKind::Countdown, &t0()).unwrap();
        engine.snapshot(&(t0() + Duration::seconds(31))).unwrap();
        engine.checkpoint(&(t0() + Duration::seconds(31)));
    }

    let mut engine = ProgressEngine::open(&store, &(t0() + Duration::hours(1)));
    assert_eq!(engine.timer(TimerKind::Countdown).status(), TimerStatus::Done);
    assert!(engine.start(TimerKind::Countdown, &t0()).is_err());

    engine.rewind(TimerKind::Countdown, &(t0() + Duration::hours(1))).unwrap();
    assert_eq!(engine.timer(TimerKind::Countdown).remaining_ms(), 30_000);
}

#[test]
fn countdown_started_then_closed_at_once_resumes_paused() {
    let store = MemoryStore::new();
    {
        let mut engine = ProgressEngine::open(&store, &t0());
        engine.configure_countdown(90, &t0());
        engine.start(TimerKind::Countdown, &t0()).unwrap();
    }
    assert!(store.saved().unwrap().countdown_timer.unwrap().started);

    let mut engine = ProgressEngine::open(&store, &(t0() + Duration::minutes(5)));
    let timer = engine.timer(TimerKind::Countdown);
    assert_eq!(timer.status(), TimerStatus::Paused);
    assert_eq!(timer.remaining_ms(), 90_000);

    // Rewinding forgets that it ever ran.
    engine.rewind(TimerKind::Countdown, &(t0() + Duration::minutes(5))).unwrap();
    let engine = ProgressEngine::open(&store, &(t0() + Duration::minutes(6)));
    assert_eq!(engine.timer(TimerKind::Countdown).status(), TimerStatus::Stopped);
}

// ============================================================================
// Deadline
// ============================================================================

#[test]
fn deadline_remaining_is_recomputed_from_target() {
    let target = t0() + Duration::days(2);
    let store = MemoryStore::new();
    {
        let mut engine = ProgressEngine::open(&store, &t0());
        engine.configure_deadline(&target, &t0());
        engine.start(TimerKind::Deadline, &t0()).unwrap();
    }

    for offset in [Duration::seconds(1), Duration::hours(7), Duration::days(1) + Duration::milliseconds(250)] {
        let now = t0() + offset;
        let mut engine = ProgressEngine::open(&store, &now);
        let snap = engine.snapshot(&now).unwrap();
        let deadline = snap.deadline.unwrap();
        let expected = (target - now).num_milliseconds() as u64;
        assert_eq!(deadline.status, TimerStatus::Running);
        assert_eq!(deadline.remaining_ms, expected);
    }
}

#[test]
fn deadline_past_target_restores_done() {
    let target = t0() + Duration::hours(1);
    let store = MemoryStore::new();
    {
        let mut engine = ProgressEngine::open(&store, &t0());
        engine.configure_deadline(&target, &t0());
        engine.start(TimerKind::Deadline, &t0()).unwrap();
    }

    let mut engine = ProgressEngine::open(&store, &(t0() + Duration::hours(2)));
    let snap = engine.snapshot(&(t0() + Duration::hours(2))).unwrap();
    let deadline = snap.deadline.unwrap();
    assert!(deadline.done);
    assert_eq!(deadline.fraction, 1.0);
}

// ============================================================================
// Anchors and files
// ============================================================================

#[test]
fn birth_date_is_persisted() {
    let store = MemoryStore::new();
    let dob = NaiveDate::from_ymd_opt(1988, 2, 29).unwrap();
    {
        let mut engine = ProgressEngine::open(&store, &t0());
        engine.set_birth_date(dob, &t0()).unwrap();
    }
    let mut engine = ProgressEngine::open(&store, &t0());
    assert_eq!(engine.dob(), Some(dob));
    let life = engine.snapshot(&t0()).unwrap().life.unwrap();
    assert_eq!(life.birthday.completed, 38);
}

#[test]
fn future_birth_date_in_store_is_ignored() {
    let state = PersistedState {
        dob: NaiveDate::from_ymd_opt(2099, 1, 1),
        ..PersistedState::default()
    };
    let store = MemoryStore::with_state(state);
    let mut engine = ProgressEngine::open(&store, &t0());
    assert!(engine.dob().is_none());
    assert!(engine.snapshot(&t0()).unwrap().life.is_none());
}

#[test]
fn json_file_store_round_trips_engine_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let target = t0() + Duration::hours(5);
    {
        let mut engine = ProgressEngine::open(JsonFileStore::new(&path), &t0());
        engine.set_birth_date(NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(), &t0()).unwrap();
        engine.configure_countdown(90, &t0());
        engine.configure_deadline(&target, &t0());
        engine.start(TimerKind::Deadline, &t0()).unwrap();
    }

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["dob"], "1990-05-20");
    assert_eq!(raw["countdown_timer"]["duration_seconds"], 90);
    assert_eq!(raw["countdown_timer"]["remaining_seconds"], 90);
    assert_eq!(raw["countdown_timer"]["started"], false);
    assert_eq!(raw["deadline_timer"]["running"], true);

    let engine = ProgressEngine::open(JsonFileStore::new(&path), &(t0() + Duration::hours(1)));
    assert_eq!(engine.timer(TimerKind::Countdown).status(), TimerStatus::Stopped);
    assert_eq!(engine.timer(TimerKind::Deadline).remaining_ms(), 4 * 3600 * 1000);
}

#[test]
fn corrupt_file_starts_from_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(store.load().unwrap().is_none());

    let mut engine = ProgressEngine::open(store, &t0());
    assert!(engine.storage_error().is_none());
    let snap = engine.snapshot(&t0()).unwrap();
    assert!(snap.life.is_none());
    assert!(snap.countdown.is_none());

    // The next command overwrites the broken file.
    engine.configure_countdown(60, &t0());
    let reloaded = JsonFileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(reloaded.countdown_timer.unwrap().duration_seconds, 60);
}

#[test]
fn unreadable_path_degrades_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be: reads and writes both fail.
    let path = dir.path().join("config.json");
    std::fs::create_dir(&path).unwrap();

    let mut engine = ProgressEngine::open(JsonFileStore::new(&path), &t0());
    assert!(engine.storage_error().is_some());

    engine.configure_countdown(60, &t0());
    engine.start(TimerKind::Countdown, &t0()).unwrap();
    assert!(engine.storage_error().is_some());
    let snap = engine.snapshot(&(t0() + Duration::seconds(10))).unwrap();
    assert_eq!(snap.countdown.unwrap().remaining_ms, 50_000);
}
