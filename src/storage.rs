//! Storage layer for todocal
//!
//! All state lives in one data directory, by default `~/.todocal`:
//!
//! ```text
//! ~/.todocal/
//!   projects.jsonl    # one Project per line
//!   tasks.jsonl       # one Task per line
//!   calendar.jsonl    # one CalendarEntry per line
//!   config.toml       # settings
//!   .lock             # held while saving
//! ```
//!
//! Every save rewrites whole tables; there is no append path.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::{CalendarEntry, Project, Task};
use crate::store::Snapshot;

/// Name of the data directory under the home directory
pub const DATA_DIR: &str = ".todocal";

const PROJECTS_FILE: &str = "projects.jsonl";
const TASKS_FILE: &str = "tasks.jsonl";
const CALENDAR_FILE: &str = "calendar.jsonl";
const CONFIG_FILE: &str = "config.toml";
const LOCK_FILE: &str = ".lock";

/// Storage manager for one data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Storage in `~/.todocal`
    pub fn in_home() -> Result<Self> {
        let base = BaseDirs::new().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine home directory",
            ))
        })?;
        Ok(Self::new(base.home_dir().join(DATA_DIR)))
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn projects_file(&self) -> PathBuf {
        self.data_dir.join(PROJECTS_FILE)
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }

    pub fn calendar_file(&self) -> PathBuf {
        self.data_dir.join(CALENDAR_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the data directory and any missing table or config file.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        for path in [self.projects_file(), self.tasks_file(), self.calendar_file()] {
            if !path.exists() {
                File::create(&path)?;
            }
        }
        let config_path = self.config_file();
        if !config_path.exists() {
            Config::default().save(&config_path)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file().exists()
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Read all records from a JSONL file; a missing file is an empty table.
    pub fn read_jsonl<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line)?;
            records.push(record);
        }

        Ok(records)
    }

    /// Replace a JSONL file with `records`, one per line.
    pub fn write_jsonl<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<()> {
        let mut buf = String::new();
        for record in records {
            buf.push_str(&serde_json::to_string(record)?);
            buf.push('\n');
        }
        lock::write_atomic(path, buf.as_bytes())
    }

    // =========================================================================
    // Tables
    // =========================================================================

    pub fn load_projects(&self) -> Result<Vec<Project>> {
        self.read_jsonl(&self.projects_file())
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        self.read_jsonl(&self.tasks_file())
    }

    pub fn load_calendar_entries(&self) -> Result<Vec<CalendarEntry>> {
        self.read_jsonl(&self.calendar_file())
    }

    pub fn save_projects(&self, projects: &[Project]) -> Result<()> {
        self.write_jsonl(&self.projects_file(), projects)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.write_jsonl(&self.tasks_file(), tasks)
    }

    pub fn save_calendar_entries(&self, entries: &[CalendarEntry]) -> Result<()> {
        self.write_jsonl(&self.calendar_file(), entries)
    }

    pub fn load_all(&self) -> Result<Snapshot> {
        let snapshot = Snapshot {
            projects: self.load_projects()?,
            tasks: self.load_tasks()?,
            calendar: self.load_calendar_entries()?,
        };
        debug!(
            dir = %self.data_dir.display(),
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            entries = snapshot.calendar.len(),
            "loaded data"
        );
        Ok(snapshot)
    }

    /// Rewrite all three tables under the data lock.
    pub fn save_all(&self, snapshot: &Snapshot) -> Result<()> {
        let _lock = FileLock::acquire(self.lock_file(), DEFAULT_LOCK_TIMEOUT_MS)?;
        self.save_projects(&snapshot.projects)?;
        self.save_tasks(&snapshot.tasks)?;
        self.save_calendar_entries(&snapshot.calendar)?;
        debug!(
            dir = %self.data_dir.display(),
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            entries = snapshot.calendar.len(),
            "saved data"
        );
        Ok(())
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from_dir(&self.data_dir)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.save(&self.config_file())
    }
}
