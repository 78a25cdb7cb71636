//! Progress engine.
//!
//! One [`ProgressEngine`] exists per process. It owns the anchors and both
//! timer slots, ticks the timers and evaluates the calendar cycles on every
//! [`ProgressEngine::snapshot`], and saves through its [`StateStore`] after
//! every state-changing command.
//!
//! The engine reads no clock of its own: every method takes `now`, so two
//! snapshots taken with the same instant and state are identical. Nothing in
//! here blocks apart from the store's `save`, and a failed save only leaves
//! the session running in memory.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = ProgressEngine::open(JsonFileStore::open_default()?, &Local::now());
//! engine.configure_countdown(25 * 60, &Local::now());
//! engine.start(TimerKind::Countdown, &Local::now())?;
//! // Every frame:
//! let snapshot = engine.snapshot(&Local::now())?;
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::calendar::{self, Anchor, Cycle, PeriodProgress, DEFAULT_LIFESPAN_YEARS};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::storage::{CountdownRecord, DeadlineRecord, PersistedState, Settings, StateStore};
use crate::timer::{Timer, TimerConfig, TimerKind, TimerStatus};

/// Life mode: progress towards the next birthday plus the whole lifespan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifeProgress {
    /// `completed` is the age in whole years.
    pub birthday: PeriodProgress,
    pub lifespan: PeriodProgress,
    pub lifespan_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub kind: TimerKind,
    pub config: TimerConfig,
    pub status: TimerStatus,
    pub remaining_ms: u64,
    pub total_ms: u64,
    pub fraction: f64,
    pub done: bool,
}

impl TimerSnapshot {
    fn of(timer: &Timer) -> Option<Self> {
        timer.config().map(|config| Self {
            kind: timer.kind(),
            config: *config,
            status: timer.status(),
            remaining_ms: timer.remaining_ms(),
            total_ms: timer.total_ms(),
            fraction: timer.fraction(),
            done: timer.status() == TimerStatus::Done,
        })
    }

    /// Remaining whole seconds, rounded up so a timer reads 00:00:00 only
    /// once it is done.
    pub fn remaining_secs(&self) -> i64 {
        i64::try_from(self.remaining_ms.div_ceil(1000)).unwrap_or(i64::MAX)
    }
}

/// Read-only aggregate of every tracked value at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub at: DateTime<FixedOffset>,
    pub day: PeriodProgress,
    pub year: PeriodProgress,
    /// `None` until a date of birth is set.
    pub life: Option<LifeProgress>,
    pub countdown: Option<TimerSnapshot>,
    pub deadline: Option<TimerSnapshot>,
}

impl ProgressSnapshot {
    pub fn cycle(&self, cycle: Cycle) -> Option<&PeriodProgress> {
        match cycle {
            Cycle::Day => Some(&self.day),
            Cycle::Year => Some(&self.year),
            Cycle::Life => self.life.as_ref().map(|life| &life.birthday),
        }
    }

    pub fn timer(&self, kind: TimerKind) -> Option<&TimerSnapshot> {
        match kind {
            TimerKind::Countdown => self.countdown.as_ref(),
            TimerKind::Deadline => self.deadline.as_ref(),
        }
    }

    /// Configured timers, countdown first.
    pub fn timers(&self) -> impl Iterator<Item = &TimerSnapshot> {
        self.countdown.iter().chain(self.deadline.iter())
    }
}

pub struct ProgressEngine<S> {
    store: S,
    settings: Settings,
    /// Date the process started; Day and Year are measured from it.
    epoch: Anchor,
    dob: Option<Anchor>,
    countdown: Timer,
    deadline: Timer,
    /// A tick changed persisted state since the last save.
    dirty: bool,
    storage_error: Option<String>,
}

impl<S: StateStore> ProgressEngine<S> {
    /// Build the engine from whatever `store` holds.
    ///
    /// A store that cannot be read yields a default engine; the error is
    /// logged and kept in [`ProgressEngine::storage_error`].
    pub fn open<Tz: TimeZone>(store: S, now: &DateTime<Tz>) -> Self {
        let (state, storage_error) = match store.load() {
            Ok(state) => (state.unwrap_or_default(), None),
            Err(e) => {
                warn!(error = %e, "failed to load state, starting from defaults");
                (PersistedState::default(), Some(e.to_string()))
            }
        };

        let utc = now.with_timezone(&Utc);
        let today = now.date_naive();

        let mut settings = state.settings;
        if let Err(e) = settings.validate() {
            warn!(error = %e, "using the default lifespan");
            settings.lifespan_years = DEFAULT_LIFESPAN_YEARS;
        }

        let dob = match state.dob {
            Some(dob) if dob > today => {
                warn!(%dob, "ignoring date of birth in the future");
                None
            }
            other => other.map(Anchor::new),
        };
        let countdown = match state.countdown_timer {
            Some(record) if record.duration_seconds > 0 => Timer::restore_countdown(
                record.duration_seconds,
                record.remaining_seconds,
                record.started,
                utc,
            ),
            _ => Timer::new(TimerKind::Countdown),
        };
        let deadline = match state.deadline_timer {
            Some(record) => Timer::restore_deadline(record.target, record.set_at, record.running, utc),
            None => Timer::new(TimerKind::Deadline),
        };

        Self {
            store,
            settings,
            epoch: Anchor::from_instant(now),
            dob,
            countdown,
            deadline,
            dirty: false,
            storage_error,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dob(&self) -> Option<NaiveDate> {
        self.dob.map(|anchor| anchor.date())
    }

    pub fn timer(&self, kind: TimerKind) -> &Timer {
        match kind {
            TimerKind::Countdown => &self.countdown,
            TimerKind::Deadline => &self.deadline,
        }
    }

    /// Message of the last failed load or save, cleared by the next
    /// successful save.
    pub fn storage_error(&self) -> Option<&str> {
        self.storage_error.as_deref()
    }

    /// Serializable projection of the current state.
    pub fn persisted_state(&self) -> PersistedState {
        let countdown_timer = match self.countdown.config() {
            Some(TimerConfig::Countdown { duration_secs }) => Some(CountdownRecord {
                duration_seconds: *duration_secs,
                remaining_seconds: self.countdown.remaining_ms().div_ceil(1000),
                started: self.countdown.status() != TimerStatus::Stopped,
            }),
            _ => None,
        };
        let deadline_timer = match self.deadline.config() {
            Some(TimerConfig::Deadline { target, set_at }) => Some(DeadlineRecord {
                target: *target,
                set_at: *set_at,
                running: matches!(self.deadline.status(), TimerStatus::Running | TimerStatus::Done),
            }),
            _ => None,
        };
        PersistedState {
            dob: self.dob(),
            countdown_timer,
            deadline_timer,
            settings: self.settings.clone(),
        }
    }

    /// Tick both timers and evaluate every cycle at `now`.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidAnchor`] when `now` is before the process epoch
    /// (the wall clock stepped back across midnight).
    pub fn snapshot<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<ProgressSnapshot> {
        self.tick(now);

        let day = calendar::progress(Cycle::Day, self.epoch, now)?;
        let year = calendar::progress(Cycle::Year, self.epoch.start_of_year(), now)?;
        let life = match self.dob {
            Some(dob) => Some(LifeProgress {
                birthday: calendar::progress(Cycle::Life, dob, now)?,
                lifespan: calendar::lifespan(dob, self.settings.lifespan_years, now)?,
                lifespan_years: self.settings.lifespan_years,
            }),
            None => None,
        };

        Ok(ProgressSnapshot {
            at: now.fixed_offset(),
            day,
            year,
            life,
            countdown: TimerSnapshot::of(&self.countdown),
            deadline: TimerSnapshot::of(&self.deadline),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn configure_countdown<Tz: TimeZone>(&mut self, duration_secs: u64, now: &DateTime<Tz>) -> Event {
        let event = self
            .countdown
            .configure(TimerConfig::Countdown { duration_secs }, now.with_timezone(&Utc));
        info!(duration_secs, "countdown configured");
        self.persist();
        event
    }

    /// Deadline counting towards `target`, measured from `now`.
    pub fn configure_deadline<Tz: TimeZone, Tz2: TimeZone>(
        &mut self,
        target: &DateTime<Tz2>,
        now: &DateTime<Tz>,
    ) -> Event {
        let now = now.with_timezone(&Utc);
        let config = TimerConfig::Deadline {
            target: target.with_timezone(&Utc),
            set_at: now,
        };
        let event = self.deadline.configure(config, now);
        info!(deadline = %target.with_timezone(&Utc), "deadline configured");
        self.persist();
        event
    }

    /// # Errors
    ///
    /// `NotConfigured` or `TimerDone`, see [`Timer::start`].
    pub fn start<Tz: TimeZone>(&mut self, kind: TimerKind, now: &DateTime<Tz>) -> Result<Option<Event>> {
        let event = self.timer_mut(kind).start(now.with_timezone(&Utc))?;
        self.persist();
        Ok(event)
    }

    /// # Errors
    ///
    /// `NotConfigured` or `NotPausable`, see [`Timer::pause`].
    pub fn pause<Tz: TimeZone>(&mut self, kind: TimerKind, now: &DateTime<Tz>) -> Result<Option<Event>> {
        let event = self.timer_mut(kind).pause(now.with_timezone(&Utc))?;
        self.persist();
        Ok(event)
    }

    /// # Errors
    ///
    /// See [`Timer::toggle`].
    pub fn toggle<Tz: TimeZone>(&mut self, kind: TimerKind, now: &DateTime<Tz>) -> Result<Option<Event>> {
        let event = self.timer_mut(kind).toggle(now.with_timezone(&Utc))?;
        self.persist();
        Ok(event)
    }

    /// # Errors
    ///
    /// `NotConfigured` or `NotRewindable`, see [`Timer::rewind`].
    pub fn rewind<Tz: TimeZone>(&mut self, kind: TimerKind, now: &DateTime<Tz>) -> Result<Event> {
        let event = self.timer_mut(kind).rewind(now.with_timezone(&Utc))?;
        self.persist();
        Ok(event)
    }

    pub fn reset<Tz: TimeZone>(&mut self, kind: TimerKind, now: &DateTime<Tz>) -> Event {
        let event = self.timer_mut(kind).reset(now.with_timezone(&Utc));
        self.persist();
        event
    }

    /// Set the Life anchor.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidAnchor`] for a date after today.
    pub fn set_birth_date<Tz: TimeZone>(&mut self, dob: NaiveDate, now: &DateTime<Tz>) -> Result<Event> {
        if dob > now.date_naive() {
            return Err(CoreError::InvalidAnchor {
                anchor: dob,
                now: now.naive_local(),
            });
        }
        self.dob = Some(Anchor::new(dob));
        self.persist();
        info!(%dob, "date of birth set");
        Ok(Event::BirthDateSet {
            dob,
            at: now.with_timezone(&Utc),
        })
    }

    /// # Errors
    ///
    /// [`CoreError::Config`] when the settings are out of range; nothing is
    /// changed then.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.persist();
        Ok(())
    }

    /// Tick, then save if a timer finished since the last save or the
    /// countdown is running. Returns whether a save was attempted.
    pub fn checkpoint<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        self.tick(now);
        if self.dirty || self.countdown.status() == TimerStatus::Running {
            self.persist();
            return true;
        }
        false
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn timer_mut(&mut self, kind: TimerKind) -> &mut Timer {
        match kind {
            TimerKind::Countdown => &mut self.countdown,
            TimerKind::Deadline => &mut self.deadline,
        }
    }

    fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        let now = now.with_timezone(&Utc);
        for timer in [&mut self.countdown, &mut self.deadline] {
            if let Some(event) = timer.tick(now) {
                info!(?event, "timer finished");
                self.dirty = true;
            }
        }
    }

    fn persist(&mut self) {
        let state = self.persisted_state();
        match self.store.save(&state) {
            Ok(()) => {
                self.dirty = false;
                self.storage_error = None;
            }
            Err(e) => {
                warn!(error = %e, "failed to save state, continuing in memory");
                self.dirty = true;
                self.storage_error = Some(e.to_string());
            }
        }
    }
}
