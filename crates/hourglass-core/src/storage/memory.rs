use std::cell::{Cell, RefCell};

use super::{PersistedState, StateStore};
use crate::error::{ConfigError, Result};

/// In-process store for tests and for running without a config file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<Option<PersistedState>>,
    saves: Cell<usize>,
    fail_saves: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
            ..Self::default()
        }
    }

    /// Last saved state, if any.
    pub fn saved(&self) -> Option<PersistedState> {
        self.state.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Make every following `save` fail with an IO error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        if self.fail_saves.get() {
            return Err(ConfigError::SaveFailed {
                path: "<memory>".into(),
                source: std::io::Error::other("save disabled"),
            }
            .into());
        }
        *self.state.borrow_mut() = Some(state.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
