//! One user session: the store, its configuration and where both persist.
//!
//! A session is built from the data directory at start-up and flushed back
//! as whole tables. Mutations go through [`Session::store_mut`], which marks
//! the session dirty so callers know a save is owed. `config.toml` is only
//! rewritten after [`Session::config_mut`], and never when it failed to load.

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::store::{Clock, Snapshot, TodoStore};

#[derive(Debug)]
pub struct Session {
    storage: Storage,
    config: Config,
    store: TodoStore,
    dirty: bool,
    config_dirty: bool,
    /// Why `config.toml` was rejected at load time, if it was.
    config_fault: Option<String>,
}

fn load_config(storage: &Storage) -> (Config, Option<String>) {
    match storage.load_config() {
        Ok(config) => (config, None),
        Err(err) => {
            warn!(path = %storage.config_file().display(), error = %err, "ignoring unreadable config");
            (Config::default(), Some(err.to_string()))
        }
    }
}

impl Session {
    /// Initialize the data directory if needed and load everything from it.
    pub fn open(storage: Storage) -> Result<Self> {
        Self::open_with_clock(storage, Clock::System)
    }

    pub fn open_with_clock(storage: Storage, clock: Clock) -> Result<Self> {
        storage.init()?;
        let (config, config_fault) = load_config(&storage);
        let snapshot = storage.load_all()?;
        Ok(Self {
            store: TodoStore::from_snapshot(snapshot, clock),
            storage,
            config,
            dirty: false,
            config_dirty: false,
            config_fault,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load error of `config.toml`; defaults are in effect while this is set.
    pub fn config_fault(&self) -> Option<&str> {
        self.config_fault.as_deref()
    }

    pub fn config_mut(&mut self) -> &mut Config {
        self.config_dirty = true;
        &mut self.config
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TodoStore {
        self.dirty = true;
        &mut self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.config_dirty
    }

    /// Current state as it would be written by [`Session::flush`].
    pub fn export(&self) -> Snapshot {
        self.store.export()
    }

    /// Discard in-memory state and reload from disk.
    pub fn reload(&mut self) -> Result<()> {
        let snapshot = self.storage.load_all()?;
        self.store.replace(snapshot);
        (self.config, self.config_fault) = load_config(&self.storage);
        self.dirty = false;
        self.config_dirty = false;
        Ok(())
    }

    /// Write all tables to disk, plus the config when it was changed.
    ///
    /// A changed config over a file that failed to load is refused with
    /// [`Error::InvalidConfig`] before anything is written.
    pub fn flush(&mut self) -> Result<()> {
        if self.config_dirty {
            if let Some(fault) = &self.config_fault {
                return Err(Error::InvalidConfig(format!(
                    "{} was not loaded ({fault}); fix it before changing settings",
                    self.storage.config_file().display()
                )));
            }
        }
        self.storage.save_all(&self.store.export())?;
        if self.config_dirty {
            self.storage.save_config(&self.config)?;
        }
        self.dirty = false;
        self.config_dirty = false;
        debug!(dir = %self.storage.data_dir().display(), "session flushed");
        Ok(())
    }

    /// Flush only when something changed since the last load or flush.
    pub fn flush_if_dirty(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }
}
