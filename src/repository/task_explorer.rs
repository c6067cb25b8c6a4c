use std::sync::Arc;
use tracing::debug;

use super::dao::TaskExecutionDao;
use crate::error::Result;
use crate::models::{Page, PageRequest, TaskExecution};

/// Read-only view over the execution store
#[derive(Clone)]
pub struct TaskExplorer {
    dao: Arc<dyn TaskExecutionDao>,
}

impl std::fmt::Debug for TaskExplorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskExplorer")
            .field("dao", &"<Arc<dyn TaskExecutionDao>>")
            .finish()
    }
}

impl TaskExplorer {
    pub fn new(dao: Arc<dyn TaskExecutionDao>) -> Self {
        Self { dao }
    }

    pub async fn get_task_execution(&self, execution_id: i64) -> Result<Option<TaskExecution>> {
        self.dao.get(execution_id).await
    }

    /// Executions of `task_name`, oldest first
    pub async fn find_task_executions_by_name(
        &self,
        task_name: &str,
        request: &PageRequest,
    ) -> Result<Page<TaskExecution>> {
        debug!(task_name, offset = request.offset(), "Finding task executions by name");
        self.dao.find_by_name(task_name, request).await
    }

    /// Executions of `task_name` without an end time, oldest first
    pub async fn find_running_task_executions(
        &self,
        task_name: &str,
        request: &PageRequest,
    ) -> Result<Page<TaskExecution>> {
        debug!(task_name, offset = request.offset(), "Finding running task executions");
        self.dao.find_running_by_name(task_name, request).await
    }

    pub async fn get_task_execution_count_by_task_name(&self, task_name: &str) -> Result<u64> {
        self.dao.count_by_name(task_name).await
    }

    pub async fn get_running_task_execution_count_by_task_name(
        &self,
        task_name: &str,
    ) -> Result<u64> {
        self.dao.count_running_by_name(task_name).await
    }

    pub async fn get_task_execution_count(&self) -> Result<u64> {
        self.dao.count_all().await
    }

    pub async fn get_task_names(&self) -> Result<Vec<String>> {
        self.dao.list_distinct_task_names().await
    }

    /// Every execution, most recent first
    pub async fn find_all(&self, request: &PageRequest) -> Result<Page<TaskExecution>> {
        self.dao.find_all(request).await
    }
}
