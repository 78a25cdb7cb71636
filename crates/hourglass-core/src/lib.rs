//! # Hourglass Core Library
//!
//! This library provides the time-progress and timer engine behind the
//! `hourglass` terminal dashboard. Everything the dashboard shows comes from
//! a single [`ProgressSnapshot`]; the presentation layer only renders it and
//! turns key presses into engine commands.
//!
//! ## Architecture
//!
//! - **Calendar Math**: Day, Year and Life windows with local-midnight
//!   boundaries and clamped anniversaries
//! - **Timer State Machine**: A wall-clock-based state machine per timer slot
//!   (Countdown, Deadline) that requires the caller to invoke `tick()`
//! - **Progress Engine**: Owns anchors and timers, aggregates snapshots and
//!   persists after every command
//! - **Storage**: JSON configuration file behind the [`StateStore`] trait
//!
//! ## Key Components
//!
//! - [`ProgressEngine`]: Entry point for the presentation layer
//! - [`Timer`]: Per-slot timer state machine
//! - [`JsonFileStore`]: Configuration file persistence
//! - [`input`]: Parsing of user-entered durations and dates

pub mod calendar;
pub mod error;
pub mod events;
pub mod input;
pub mod progress;
pub mod storage;
pub mod timer;

pub use calendar::{Anchor, Cycle, PeriodProgress};
pub use error::{ConfigError, CoreError, ParseError};
pub use events::Event;
pub use progress::{LifeProgress, ProgressEngine, ProgressSnapshot, TimerSnapshot};
pub use storage::{JsonFileStore, MemoryStore, PersistedState, Settings, StateStore};
pub use timer::{Timer, TimerConfig, TimerKind, TimerStatus};
