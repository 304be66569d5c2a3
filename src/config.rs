//! Configuration loading and management
//!
//! Settings live in `<data_dir>/config.toml` as flat key/value pairs. Two keys
//! are understood; anything else is kept verbatim so `config set` can store
//! arbitrary notes alongside them.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::store::SortOrder;

pub const SORT_ORDER_KEY: &str = "sort_order";
pub const CURRENT_QUARTER_KEY: &str = "current_quarter";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Sibling order of active task listings
    #[serde(default)]
    pub sort_order: SortOrder,

    /// Informational quarter label, `YYYY-Qn`
    #[serde(default = "default_current_quarter")]
    pub current_quarter: String,

    /// Unrecognized keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::default(),
            current_quarter: default_current_quarter(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_current_quarter() -> String {
    quarter_label(Local::now().date_naive())
}

/// Quarter label for `date`, e.g. `2024-Q2`.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1)
}

fn validate_quarter(value: &str) -> Result<()> {
    let invalid = || {
        Error::InvalidConfig(format!(
            "{CURRENT_QUARTER_KEY}: '{value}' is not of the form YYYY-Qn"
        ))
    };
    let (year, quarter) = value.split_once("-Q").ok_or_else(invalid)?;
    if year.len() != 4 || !year.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }
    match quarter {
        "1" | "2" | "3" | "4" => Ok(()),
        _ => Err(invalid()),
    }
}

impl Config {
    /// Load configuration from a `config.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a data directory; defaults when there is no file
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load(&config_path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        crate::lock::write_atomic(path, content.as_bytes())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            SORT_ORDER_KEY => Some(self.sort_order.to_string()),
            CURRENT_QUARTER_KEY => Some(self.current_quarter.clone()),
            other => self.extra.get(other).cloned(),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Validation("config key cannot be empty".to_string()));
        }
        match key {
            SORT_ORDER_KEY => self.sort_order = value.parse()?,
            CURRENT_QUARTER_KEY => {
                let value = value.trim();
                validate_quarter(value)?;
                self.current_quarter = value.to_string();
            }
            other => {
                self.extra.insert(other.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// All settings as key/value pairs, known keys first.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            (SORT_ORDER_KEY.to_string(), self.sort_order.to_string()),
            (CURRENT_QUARTER_KEY.to_string(), self.current_quarter.clone()),
        ];
        entries.extend(
            self.extra
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        entries
    }

    fn validate(&self) -> Result<()> {
        validate_quarter(&self.current_quarter)
    }
}
