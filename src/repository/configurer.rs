use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::dao::{MapTaskExecutionDao, SqlTaskExecutionDao, TaskExecutionDao};
use super::task_explorer::TaskExplorer;
use super::task_repository::TaskRepository;
use crate::config::TaskCoreConfig;
use crate::database::{DatabaseConnection, TaskSchema};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    Database,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("in_memory"),
            Self::Database => f.write_str("database"),
        }
    }
}

/// Wires one DAO into a [`TaskRepository`] and a [`TaskExplorer`].
///
/// A configured `database.url` selects the PostgreSQL backend; otherwise
/// executions live in process memory and vanish with it.
#[derive(Clone)]
pub struct TaskConfigurer {
    dao: Arc<dyn TaskExecutionDao>,
    backend: StorageBackend,
}

impl fmt::Debug for TaskConfigurer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskConfigurer")
            .field("backend", &self.backend)
            .finish()
    }
}

impl TaskConfigurer {
    pub async fn from_config(config: &TaskCoreConfig) -> Result<Self> {
        config.validate()?;

        if !config.is_durable() {
            info!(backend = %StorageBackend::InMemory, "Task execution store selected");
            return Ok(Self::in_memory());
        }

        let dialect = config.effective_dialect()?;
        let connection = DatabaseConnection::connect(&config.database).await?;
        let pool = connection.pool().clone();

        if config.database.initialize_schema {
            TaskSchema::new(&config.database.table_prefix)?
                .init(&pool)
                .await?;
        }

        let dao = SqlTaskExecutionDao::with_options(pool, &config.database.table_prefix, dialect)?;
        info!(
            backend = %StorageBackend::Database,
            dialect = %dialect,
            table_prefix = %config.database.table_prefix,
            "Task execution store selected"
        );

        Ok(Self {
            dao: Arc::new(dao),
            backend: StorageBackend::Database,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            dao: Arc::new(MapTaskExecutionDao::new()),
            backend: StorageBackend::InMemory,
        }
    }

    /// Use a caller-supplied DAO
    pub fn with_dao(dao: Arc<dyn TaskExecutionDao>, backend: StorageBackend) -> Self {
        Self { dao, backend }
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn dao(&self) -> Arc<dyn TaskExecutionDao> {
        Arc::clone(&self.dao)
    }

    pub fn repository(&self) -> TaskRepository {
        TaskRepository::new(self.dao())
    }

    pub fn explorer(&self) -> TaskExplorer {
        TaskExplorer::new(self.dao())
    }
}
