//! Timer state machine.
//!
//! A timer is wall-clock based and owns no thread: every operation takes the
//! current instant and returns immediately. The caller drives progress by
//! calling `tick(now)` as often as it likes.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running -> Done
//!    ^________ reset / rewind (from any state) ______|
//! ```
//!
//! Deadlines never enter `Paused`: they track a fixed instant, so pausing one
//! fails with `NotPausable`.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::config::{TimerConfig, TimerKind, TimerStatus};
use crate::error::{CoreError, Result};
use crate::events::Event;

#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    kind: TimerKind,
    config: Option<TimerConfig>,
    status: TimerStatus,
    /// Remaining time in milliseconds.
    remaining_ms: u64,
    /// Instant of the last transition or tick. Elapsed time is always
    /// measured from here, so a repeated tick at the same instant is a no-op.
    last_tick: Option<DateTime<Utc>>,
}

impl Timer {
    /// An unconfigured timer for the given slot, `Stopped`.
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            config: None,
            status: TimerStatus::Stopped,
            remaining_ms: 0,
            last_tick: None,
        }
    }

    /// Rebuild a countdown from its persisted remaining time.
    ///
    /// A countdown that was started comes back paused, one that never ran
    /// comes back stopped and one that had finished comes back done.
    pub fn restore_countdown(
        duration_secs: u64,
        remaining_secs: u64,
        started: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let remaining_secs = remaining_secs.min(duration_secs);
        let status = if remaining_secs == 0 {
            TimerStatus::Done
        } else if started || remaining_secs < duration_secs {
            TimerStatus::Paused
        } else {
            TimerStatus::Stopped
        };
        Self {
            kind: TimerKind::Countdown,
            config: Some(TimerConfig::Countdown { duration_secs }),
            status,
            remaining_ms: remaining_secs.saturating_mul(1000),
            last_tick: Some(now),
        }
    }

    /// Rebuild a deadline. Remaining time is recomputed from the fixed target,
    /// never carried over.
    pub fn restore_deadline(
        target: DateTime<Utc>,
        set_at: DateTime<Utc>,
        running: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let mut timer = Self::new(TimerKind::Deadline);
        timer.configure(TimerConfig::Deadline { target, set_at }, now);
        if running {
            timer.status = TimerStatus::Running;
            timer.tick(now);
        }
        timer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn config(&self) -> Option<&TimerConfig> {
        self.config.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.last_tick
    }

    /// Full span of the timer: the countdown duration, or `target - set_at`.
    pub fn total_ms(&self) -> u64 {
        match self.config {
            Some(TimerConfig::Countdown { duration_secs }) => duration_secs.saturating_mul(1000),
            Some(TimerConfig::Deadline { target, set_at }) => ms_between(set_at, target),
            None => 0,
        }
    }

    /// 0.0 .. 1.0 progress towards zero remaining.
    pub fn fraction(&self) -> f64 {
        if self.config.is_none() {
            return 0.0;
        }
        if self.status == TimerStatus::Done {
            return 1.0;
        }
        let total = self.total_ms();
        if total == 0 {
            return 1.0;
        }
        (1.0 - self.remaining_ms as f64 / total as f64).clamp(0.0, 1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the configuration and go back to `Stopped`, from any state.
    pub fn configure(&mut self, config: TimerConfig, now: DateTime<Utc>) -> Event {
        self.kind = config.kind();
        self.config = Some(config);
        self.status = TimerStatus::Stopped;
        self.remaining_ms = match config {
            TimerConfig::Countdown { duration_secs } => duration_secs.saturating_mul(1000),
            TimerConfig::Deadline { target, .. } => ms_between(now, target),
        };
        self.last_tick = Some(now);
        debug!(kind = %self.kind, remaining_ms = self.remaining_ms, "timer configured");
        Event::TimerConfigured {
            kind: self.kind,
            total_ms: self.total_ms(),
            at: now,
        }
    }

    /// `Stopped | Paused -> Running`. Returns `Ok(None)` if already running.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without a config, `TimerDone` once finished.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        let Some(config) = self.config else {
            return Err(CoreError::NotConfigured { kind: self.kind });
        };
        match self.status {
            TimerStatus::Running => Ok(None),
            TimerStatus::Done => Err(CoreError::TimerDone { kind: self.kind }),
            TimerStatus::Stopped | TimerStatus::Paused => {
                if let TimerConfig::Deadline { target, .. } = config {
                    self.remaining_ms = ms_between(now, target);
                }
                self.status = TimerStatus::Running;
                self.last_tick = Some(now);
                debug!(kind = %self.kind, remaining_ms = self.remaining_ms, "timer started");
                Ok(Some(Event::TimerStarted {
                    kind: self.kind,
                    remaining_ms: self.remaining_ms,
                    at: now,
                }))
            }
        }
    }

    /// `Running -> Paused` for countdowns. Other states are left alone.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without a config, `NotPausable` for deadlines.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        match self.config {
            None => Err(CoreError::NotConfigured { kind: self.kind }),
            Some(TimerConfig::Deadline { .. }) => Err(CoreError::NotPausable { kind: self.kind }),
            Some(TimerConfig::Countdown { .. }) => {
                if self.status != TimerStatus::Running {
                    return Ok(None);
                }
                self.flush_elapsed(now);
                if self.remaining_ms == 0 {
                    return Ok(Some(self.complete(now)));
                }
                self.status = TimerStatus::Paused;
                debug!(kind = %self.kind, remaining_ms = self.remaining_ms, "timer paused");
                Ok(Some(Event::TimerPaused {
                    kind: self.kind,
                    remaining_ms: self.remaining_ms,
                    at: now,
                }))
            }
        }
    }

    /// Pause when running, start otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`Timer::start`] and [`Timer::pause`].
    pub fn toggle(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        if self.status == TimerStatus::Running {
            self.pause(now)
        } else {
            self.start(now)
        }
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` on the tick
    /// that reaches zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        match self.config {
            Some(TimerConfig::Countdown { .. }) => self.flush_elapsed(now),
            Some(TimerConfig::Deadline { target, .. }) => {
                self.remaining_ms = ms_between(now, target);
                self.last_tick = Some(now);
            }
            None => return None,
        }
        if self.remaining_ms == 0 {
            return Some(self.complete(now));
        }
        None
    }

    /// Put a countdown back to its full duration, `Stopped`, config kept.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without a config, `NotRewindable` for deadlines.
    pub fn rewind(&mut self, now: DateTime<Utc>) -> Result<Event> {
        match self.config {
            None => Err(CoreError::NotConfigured { kind: self.kind }),
            Some(TimerConfig::Deadline { .. }) => Err(CoreError::NotRewindable { kind: self.kind }),
            Some(TimerConfig::Countdown { duration_secs }) => {
                self.status = TimerStatus::Stopped;
                self.remaining_ms = duration_secs.saturating_mul(1000);
                self.last_tick = Some(now);
                Ok(Event::TimerRewound {
                    kind: self.kind,
                    remaining_ms: self.remaining_ms,
                    at: now,
                })
            }
        }
    }

    /// Any state -> `Stopped`, config cleared.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.config = None;
        self.status = TimerStatus::Stopped;
        self.remaining_ms = 0;
        self.last_tick = Some(now);
        debug!(kind = %self.kind, "timer reset");
        Event::TimerReset { kind: self.kind, at: now }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_tick {
            self.remaining_ms = self.remaining_ms.saturating_sub(ms_between(last, now));
        }
        // A wall clock that stepped backwards moves the reference with it,
        // so time is never subtracted twice.
        self.last_tick = Some(now);
    }

    fn complete(&mut self, now: DateTime<Utc>) -> Event {
        self.status = TimerStatus::Done;
        self.remaining_ms = 0;
        self.last_tick = Some(now);
        debug!(kind = %self.kind, "timer done");
        Event::TimerCompleted { kind: self.kind, at: now }
    }
}

/// Milliseconds from `from` to `to`, zero if `to` is not later.
fn ms_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from(to.signed_duration_since(from).num_milliseconds()).unwrap_or(0)
}
