//! Core error types for hourglass-core.
//!
//! Every engine operation returns one of these as an explicit result. None of
//! them is fatal to the running process: the presentation layer decides
//! whether to show a message, re-prompt, or carry on.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::timer::TimerKind;

/// Core error type for hourglass-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The evaluated instant lies before the anchor date of a cycle.
    #[error("Invalid anchor: {now} is before anchor date {anchor}")]
    InvalidAnchor {
        anchor: NaiveDate,
        now: NaiveDateTime,
    },

    /// A command needs a configured timer in that slot.
    #[error("{kind} timer is not configured")]
    NotConfigured { kind: TimerKind },

    /// Deadlines track a fixed external instant and cannot be paused.
    #[error("{kind} timer cannot be paused")]
    NotPausable { kind: TimerKind },

    /// Only countdowns have an original duration to go back to.
    #[error("{kind} timer cannot be reset to its original duration")]
    NotRewindable { kind: TimerKind },

    /// `Done` is terminal until the timer is reset or rewound.
    #[error("{kind} timer is done; reset it to start again")]
    TimerDone { kind: TimerKind },

    /// Malformed user input
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from user-entered durations, deadlines and dates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Enter 6 digits (HHMMSS), got '{input}'")]
    DurationDigits { input: String },

    #[error("Minutes and seconds must be below 60, got '{input}'")]
    DurationRange { input: String },

    #[error("Duration must be at least 1 second")]
    DurationTooShort,

    #[error("Enter 12 digits (YYYYMMDDHHMM), got '{input}'")]
    DeadlineDigits { input: String },

    #[error("'{input}' is not a valid local date and time")]
    InvalidDateTime { input: String },

    #[error("'{input}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { input: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to load configuration from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the configuration file
    #[error("Failed to save configuration to {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration directory could not be determined
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// Dotted key does not name an existing field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value does not fit the type of the field
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
