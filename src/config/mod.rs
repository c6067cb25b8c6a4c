//! # Task Core Configuration
//!
//! Layered configuration for the execution store: an optional TOML/YAML/JSON
//! file, overridden by `TASKEXEC_*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskexec_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! if manager.config().is_durable() {
//!     println!("dialect: {}", manager.config().effective_dialect()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Environment keys use `__` between nesting levels, e.g.
//! `TASKEXEC_DATABASE__URL` or `TASKEXEC_LOGGING__JSON=true`.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::constants::{schema, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_MAX_CONNECTIONS};
use crate::error::{Result, TaskRepositoryError};
use crate::query_builder::DatabaseDialect;
use crate::repository::dao::sql_dao::{ensure_supported_dialect, validate_table_prefix};

pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TaskCoreConfig {
    /// Durable store settings; without a URL the in-memory store is used
    pub database: DatabaseConfig,

    pub logging: LoggingConfig,

    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub table_prefix: String,
    /// Overrides the dialect inferred from `url`
    pub dialect: Option<DatabaseDialect>,
    /// Run the idempotent schema bootstrap on startup
    pub initialize_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            table_prefix: schema::DEFAULT_TABLE_PREFIX.to_string(),
            dialect: None,
            initialize_schema: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; falls back to `RUST_LOG`, then the environment default
    pub level: Option<String>,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl TaskCoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(TaskRepositoryError::configuration(
                "database.max_connections must be at least 1",
            ));
        }
        validate_table_prefix(&self.database.table_prefix)?;
        if self.events.channel_capacity == 0 {
            return Err(TaskRepositoryError::configuration(
                "events.channel_capacity must be at least 1",
            ));
        }
        if self.is_durable() {
            ensure_supported_dialect(self.effective_dialect()?)?;
        }
        Ok(())
    }

    /// True when a database URL is configured
    pub fn is_durable(&self) -> bool {
        self.database
            .url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Explicit dialect, else the one implied by the URL, else PostgreSQL
    pub fn effective_dialect(&self) -> Result<DatabaseDialect> {
        match (self.database.dialect, self.database.url.as_deref()) {
            (Some(dialect), _) => Ok(dialect),
            (None, Some(url)) => DatabaseDialect::from_url(url),
            (None, None) => Ok(DatabaseDialect::Postgres),
        }
    }
}
