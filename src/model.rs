//! Record types shared by the store, the calendar and storage.
//!
//! Every record is persisted as one JSON object per line with a fixed set of
//! fields; optional values are written as `null` rather than omitted.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::WeekCategory;
use crate::error::{Error, Result};

/// Global identifier shared by projects and tasks.
pub type EntityId = u64;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Sort rank, most urgent first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "h" | "high" => Ok(Priority::High),
            "m" | "medium" => Ok(Priority::Medium),
            "l" | "low" => Ok(Priority::Low),
            other => Err(Error::Validation(format!(
                "invalid priority '{other}' (expected high|medium|low)"
            ))),
        }
    }
}

/// Recurrence marker. Stored and editable, never acted upon.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RepeatType {
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatType::None => "none",
            RepeatType::Daily => "daily",
            RepeatType::Weekly => "weekly",
            RepeatType::Monthly => "monthly",
        }
    }

    pub fn is_repeating(self) -> bool {
        self != RepeatType::None
    }
}

impl fmt::Display for RepeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "n" | "none" => Ok(RepeatType::None),
            "d" | "daily" => Ok(RepeatType::Daily),
            "w" | "weekly" => Ok(RepeatType::Weekly),
            "m" | "monthly" => Ok(RepeatType::Monthly),
            other => Err(Error::Validation(format!(
                "invalid repeat type '{other}' (expected none|daily|weekly|monthly)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub priority: Priority,
    pub created_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: EntityId,
    pub project_id: EntityId,
    /// Mirror of the owning project's name.
    pub project_name: String,
    /// Sequence number among siblings.
    pub task_id: u32,
    pub name: String,
    pub level: u32,
    pub priority: Priority,
    #[serde(default)]
    pub repeat_type: RepeatType,
    pub created_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,
    pub parent_id: Option<EntityId>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.completed_date.is_none()
    }
}

/// One completion event. Names are copies, matched by string on rename/delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    /// Zero-padded month, e.g. `"03"`.
    pub month: String,
    pub week: WeekCategory,
    /// English weekday name, e.g. `"Tuesday"`.
    pub weekday: String,
    /// Day of month without padding.
    pub day: String,
    pub completed_task: String,
    pub project_name: String,
}

/// Trim a user supplied name and reject blanks.
pub(crate) fn normalize_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{what} name cannot be empty")));
    }
    Ok(trimmed.to_string())
}
