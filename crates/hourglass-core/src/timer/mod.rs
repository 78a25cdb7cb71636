mod config;
mod engine;

pub use config::{TimerConfig, TimerKind, TimerStatus};
pub use engine::Timer;
