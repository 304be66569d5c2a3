//! todocal - Personal Task Tracker Library
//!
//! Core of the todocal CLI: an in-memory project/task store with cascading
//! deletes and rename propagation, a completion calendar, and a fixed-width
//! table renderer for month reports.
//!
//! # Core Concepts
//!
//! - **Projects**: top-level containers, numbered by position
//! - **Tasks**: nested under a project or an open task, `level` = depth
//! - **Calendar**: one entry per completion, matched to tasks by name
//! - **Week categories**: Sat-Sun-Mon, Tue-Wed and Thu-Fri runs of a month
//!
//! # Module Organization
//!
//! - `model`: Project, Task and CalendarEntry records
//! - `ids`: global id allocation
//! - `store`: the task hierarchy engine
//! - `calendar`: completion log and month aggregation
//! - `render`: display-width aware table rendering
//! - `storage`: JSONL tables in the data directory
//! - `lock`: advisory file lock and atomic writes
//! - `config`: `config.toml` settings
//! - `session`: load, mutate, save
//! - `cli` / `output`: command line and result formatting
//! - `error`: error types and exit codes

pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod ids;
pub mod lock;
pub mod model;
pub mod output;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;

pub use error::{Error, Result};
