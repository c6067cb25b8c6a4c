//! # Task Execution DAO
//!
//! The storage contract shared by the in-memory and the PostgreSQL backends.
//!
//! ## Ordering
//!
//! Name-filtered queries return executions oldest first, by
//! `(start_time, execution_id)`. [`TaskExecutionDao::find_all`] returns the
//! reverse: most recent first, ties broken by the higher execution id.
//!
//! ## Update policy
//!
//! Both backends require the execution to exist before `update` and report
//! [`TaskRepositoryError::NotFound`] otherwise. `update` persists only the
//! end/exit fields; name, start time and parameters are fixed at `save`.

pub mod map_dao;
pub mod sql_dao;

use async_trait::async_trait;

use crate::error::{Result, TaskRepositoryError};
use crate::models::{Page, PageRequest, TaskExecution};

pub use map_dao::MapTaskExecutionDao;
pub use sql_dao::{SqlTaskExecutionDao, TaskExecutionQueries};

#[async_trait]
pub trait TaskExecutionDao: Send + Sync {
    /// Insert a new execution; fails with `DuplicateKey` if the id is taken
    async fn save(&self, execution: &TaskExecution) -> Result<()>;

    /// Persist end/exit fields of an existing execution
    async fn update(&self, execution: &TaskExecution) -> Result<()>;

    /// Look up one execution
    async fn get(&self, execution_id: i64) -> Result<Option<TaskExecution>>;

    async fn count_by_name(&self, task_name: &str) -> Result<u64>;

    async fn count_running_by_name(&self, task_name: &str) -> Result<u64>;

    async fn count_all(&self) -> Result<u64>;

    async fn find_running_by_name(
        &self,
        task_name: &str,
        request: &PageRequest,
    ) -> Result<Page<TaskExecution>>;

    async fn find_by_name(&self, task_name: &str, request: &PageRequest)
        -> Result<Page<TaskExecution>>;

    /// Sorted, deduplicated task names
    async fn list_distinct_task_names(&self) -> Result<Vec<String>>;

    async fn find_all(&self, request: &PageRequest) -> Result<Page<TaskExecution>>;

    /// Reserve the next execution id from this store's allocator
    async fn next_execution_id(&self) -> Result<i64>;
}

/// Reject updates that would clear an end time that is already recorded
pub(crate) fn ensure_end_time_kept(stored: &TaskExecution, updated: &TaskExecution) -> Result<()> {
    if stored.end_time.is_some() && updated.end_time.is_none() {
        return Err(TaskRepositoryError::invalid_argument(format!(
            "end time of task execution {} cannot be cleared",
            stored.execution_id
        )));
    }
    Ok(())
}
