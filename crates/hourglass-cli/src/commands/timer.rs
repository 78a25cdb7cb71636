use chrono::Local;
use clap::{Subcommand, ValueEnum};
use hourglass_core::input::{parse_countdown, parse_deadline};
use hourglass_core::{Event, TimerKind};

use super::{ensure_saved, open_engine};

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Countdown,
    Deadline,
}

impl From<KindArg> for TimerKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Countdown => TimerKind::Countdown,
            KindArg::Deadline => TimerKind::Deadline,
        }
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Configure a countdown, saved paused for the dashboard to run
    Countdown {
        /// Duration as HHMMSS (separators allowed, e.g. 01:30:00)
        duration: String,
    },
    /// Configure and start a deadline
    Deadline {
        /// Local target as YYYYMMDDHHMM (separators allowed, e.g. "2026-12-31 23:00")
        target: String,
    },
    /// Start a deadline (countdowns only run inside the dashboard)
    Start {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Pause a timer (countdowns only run inside the dashboard)
    Pause {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Pause when running, start otherwise (deadlines only)
    Toggle {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Clear a timer
    Reset {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Put a countdown back to its original duration
    Rewind {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Print both timers as JSON
    Status,
}

/// A countdown is measured by the dashboard's frame loop; a one-shot process
/// exits before any of it elapses.
fn dashboard_only(kind: KindArg) -> Result<TimerKind, Box<dyn std::error::Error>> {
    match kind {
        KindArg::Countdown => {
            Err("countdowns only run inside the dashboard; start `hourglass` and use the countdown menu".into())
        }
        KindArg::Deadline => Ok(TimerKind::Deadline),
    }
}

fn print_events(events: impl IntoIterator<Item = Event>) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    let now = Local::now();

    match action {
        TimerAction::Countdown { duration } => {
            let secs = parse_countdown(&duration)?;
            let configured = engine.configure_countdown(secs, &now);
            let started = engine.start(TimerKind::Countdown, &now)?;
            let paused = engine.pause(TimerKind::Countdown, &now)?;
            ensure_saved(&engine)?;
            print_events(std::iter::once(configured).chain(started).chain(paused))?;
            println!("countdown saved paused; it runs while `hourglass` is open");
        }
        TimerAction::Deadline { target } => {
            let target = parse_deadline(&target, &Local)?;
            let configured = engine.configure_deadline(&target, &now);
            let started = engine.start(TimerKind::Deadline, &now)?;
            ensure_saved(&engine)?;
            print_events(std::iter::once(configured).chain(started))?;
        }
        TimerAction::Start { kind } => {
            let event = engine.start(dashboard_only(kind)?, &now)?;
            ensure_saved(&engine)?;
            print_events(event)?;
        }
        TimerAction::Pause { kind } => {
            let event = engine.pause(dashboard_only(kind)?, &now)?;
            ensure_saved(&engine)?;
            print_events(event)?;
        }
        TimerAction::Toggle { kind } => {
            let event = engine.toggle(dashboard_only(kind)?, &now)?;
            ensure_saved(&engine)?;
            print_events(event)?;
        }
        TimerAction::Reset { kind } => {
            let event = engine.reset(kind.into(), &now);
            ensure_saved(&engine)?;
            print_events([event])?;
        }
        TimerAction::Rewind { kind } => {
            let event = engine.rewind(kind.into(), &now)?;
            ensure_saved(&engine)?;
            print_events([event])?;
        }
        TimerAction::Status => {
            let snapshot = engine.snapshot(&now)?;
            let status = serde_json::json!({
                "countdown": snapshot.countdown,
                "deadline": snapshot.deadline,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
            // Keep a completion noticed here for the next run.
            engine.checkpoint(&now);
        }
    }
    Ok(())
}
