mod config;
mod memory;

pub use config::{CountdownRecord, DeadlineRecord, JsonFileStore, PersistedState, Settings};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Storage primitive the engine persists through.
///
/// The engine calls `load` once at startup and `save` after every
/// state-changing command. Implementations report unreadable or partially
/// written state as `Ok(None)` so the engine starts from defaults.
pub trait StateStore {
    /// # Errors
    ///
    /// Returns an error only when the storage itself cannot be read.
    fn load(&self) -> Result<Option<PersistedState>>;

    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, state: &PersistedState) -> Result<()>;
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn load(&self) -> Result<Option<PersistedState>> {
        (**self).load()
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        (**self).save(state)
    }
}

/// Returns `<config dir>/hourglass[-dev]/config.json`.
///
/// `HOURGLASS_CONFIG` overrides the whole path. Set `HOURGLASS_ENV=dev` to
/// use the development directory.
///
/// # Errors
/// Returns an error if the platform config directory cannot be determined.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("HOURGLASS_CONFIG").filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let env = std::env::var("HOURGLASS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("hourglass-dev")
    } else {
        base_dir.join("hourglass")
    };

    Ok(dir.join("config.json"))
}
