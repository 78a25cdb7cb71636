use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the two timer slots a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Countdown,
    Deadline,
}

impl TimerKind {
    pub fn label(self) -> &'static str {
        match self {
            TimerKind::Countdown => "COUNTDOWN",
            TimerKind::Deadline => "DEADLINE",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Countdown => f.write_str("Countdown"),
            TimerKind::Deadline => f.write_str("Deadline"),
        }
    }
}

/// What a configured timer counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimerConfig {
    /// Fixed span, pausable.
    Countdown { duration_secs: u64 },
    /// Fixed instant. `set_at` is when the deadline was configured and is
    /// the zero point of its progress fraction.
    Deadline {
        target: DateTime<Utc>,
        set_at: DateTime<Utc>,
    },
}

impl TimerConfig {
    pub fn kind(&self) -> TimerKind {
        match self {
            TimerConfig::Countdown { .. } => TimerKind::Countdown,
            TimerConfig::Deadline { .. } => TimerKind::Deadline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Stopped,
    Running,
    Paused,
    Done,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimerStatus::Stopped => "stopped",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Done => "done",
        };
        f.write_str(s)
    }
}
