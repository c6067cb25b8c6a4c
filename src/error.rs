//! # Task Repository Error Types
//!
//! Structured error handling for the execution repository using thiserror.
//! Errors are surfaced to callers unmodified; nothing in this crate retries or
//! swallows a storage failure, since execution records are audit data.

use thiserror::Error;

/// PostgreSQL SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum TaskRepositoryError {
    #[error("Task execution not found: {execution_id}")]
    NotFound { execution_id: i64 },

    #[error("Task execution already exists: {execution_id}")]
    DuplicateKey { execution_id: i64 },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Database error: {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaskRepositoryError>;

impl TaskRepositoryError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Classify a driver error raised while running `operation`.
    ///
    /// `execution_id` is reported on unique violations so that a failed
    /// insert reads as [`TaskRepositoryError::DuplicateKey`].
    pub fn from_sqlx(operation: &str, execution_id: Option<i64>, error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::StorageUnavailable {
                message: format!("{operation}: {error}"),
            },
            sqlx::Error::Database(db_error)
                if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                match execution_id {
                    Some(execution_id) => Self::DuplicateKey { execution_id },
                    None => Self::Database {
                        operation: operation.to_string(),
                        message: error.to_string(),
                    },
                }
            }
            _ => Self::Database {
                operation: operation.to_string(),
                message: error.to_string(),
            },
        }
    }

    /// True when the backing store could not be reached at all
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}

impl From<sqlx::Error> for TaskRepositoryError {
    fn from(error: sqlx::Error) -> Self {
        Self::from_sqlx("query", None, error)
    }
}

impl From<config::ConfigError> for TaskRepositoryError {
    fn from(error: config::ConfigError) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}
