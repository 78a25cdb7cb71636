pub mod config;
pub mod dob;
pub mod timer;

use chrono::Local;
use hourglass_core::{JsonFileStore, ProgressEngine};

/// Engine backed by the default config file, opened at the current instant.
pub fn open_engine() -> Result<ProgressEngine<JsonFileStore>, Box<dyn std::error::Error>> {
    let store = JsonFileStore::open_default()?;
    Ok(ProgressEngine::open(store, &Local::now()))
}

/// One-shot commands have nothing to show if their change was not written.
pub fn ensure_saved(engine: &ProgressEngine<JsonFileStore>) -> Result<(), Box<dyn std::error::Error>> {
    match engine.storage_error() {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}
