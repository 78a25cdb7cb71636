use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerKind;

/// Every state change in the engine produces an Event.
/// The presentation layer may print or log them; nothing depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerConfigured {
        kind: TimerKind,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        kind: TimerKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        kind: TimerKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        kind: TimerKind,
        at: DateTime<Utc>,
    },
    /// Countdown put back to its full duration, config kept.
    TimerRewound {
        kind: TimerKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Timer cleared, config dropped.
    TimerReset {
        kind: TimerKind,
        at: DateTime<Utc>,
    },
    BirthDateSet {
        dob: NaiveDate,
        at: DateTime<Utc>,
    },
}
