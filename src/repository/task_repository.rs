use std::sync::Arc;
use tracing::{info, instrument};

use super::dao::TaskExecutionDao;
use crate::error::Result;
use crate::models::TaskExecution;

/// Write side of the execution store: id allocation, creation and updates
#[derive(Clone)]
pub struct TaskRepository {
    dao: Arc<dyn TaskExecutionDao>,
}

impl std::fmt::Debug for TaskRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRepository")
            .field("dao", &"<Arc<dyn TaskExecutionDao>>")
            .finish()
    }
}

impl TaskRepository {
    pub fn new(dao: Arc<dyn TaskExecutionDao>) -> Self {
        Self { dao }
    }

    /// Persist a new execution.
    ///
    /// All-or-nothing: the durable store writes the execution and its
    /// parameters in one transaction, the in-memory store in one insert.
    #[instrument(skip(self, execution), fields(execution_id = execution.execution_id))]
    pub async fn create_task_execution(&self, execution: &TaskExecution) -> Result<()> {
        self.dao.save(execution).await?;
        info!(task_name = %execution.task_name, "Created task execution");
        Ok(())
    }

    /// Persist end time, exit code and exit message
    #[instrument(skip(self, execution), fields(execution_id = execution.execution_id))]
    pub async fn update(&self, execution: &TaskExecution) -> Result<()> {
        self.dao.update(execution).await
    }

    pub async fn get_next_execution_id(&self) -> Result<i64> {
        self.dao.next_execution_id().await
    }
}
