//! Error types for todocal
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (empty name, bad enum value, unknown id, bad config)
//! - 3: Confirmation required (cascading delete not confirmed)
//! - 4: Operation failed (I/O, serialization, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the todocal CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const CONFIRMATION_REQUIRED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for todocal operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Needs an explicit yes from the caller (exit code 3)
    #[error("{target} has {count} dependent task(s); confirmation required")]
    ConfirmationRequired { target: String, count: usize },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) | Error::NotFound(_) | Error::InvalidConfig(_) => {
                exit_codes::USER_ERROR
            }

            Error::ConfirmationRequired { .. } => exit_codes::CONFIRMATION_REQUIRED,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::ConfirmationRequired { target, count } => Some(serde_json::json!({
                "target": target,
                "count": count,
            })),
            _ => None,
        }
    }

    /// Affected count when this is a pending cascading delete
    pub fn confirmation_count(&self) -> Option<usize> {
        match self {
            Error::ConfirmationRequired { count, .. } => Some(*count),
            _ => None,
        }
    }
}

/// Result type alias for todocal operations
pub type Result<T> = std::result::Result<T, Error>;
