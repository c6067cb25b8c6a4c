use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::status::{BatchStatus, ExitStatus};

/// Key/value state a step carries between runs
pub type ExecutionContext = BTreeMap<String, Value>;

/// A captured failure cause. Shared so snapshots can be cloned cheaply.
pub type FailureCause = Arc<anyhow::Error>;

/// The batch engine's view of one step run.
///
/// Only read by this crate, through
/// [`StepExecutionEvent::try_from`](super::StepExecutionEvent).
#[derive(Debug, Clone)]
pub struct StepExecution {
    pub id: Option<i64>,
    pub version: Option<i32>,
    /// `None` when the step is detached from its job execution
    pub job_execution_id: Option<i64>,
    pub step_name: String,
    pub status: BatchStatus,
    pub read_count: u32,
    pub write_count: u32,
    pub commit_count: u32,
    pub rollback_count: u32,
    pub read_skip_count: u32,
    pub process_skip_count: u32,
    pub write_skip_count: u32,
    pub filter_count: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub execution_context: ExecutionContext,
    pub exit_status: ExitStatus,
    pub terminate_only: bool,
    pub failure_exceptions: Vec<FailureCause>,
}

impl StepExecution {
    pub fn new(step_name: impl Into<String>, job_execution_id: i64) -> Self {
        Self {
            id: None,
            version: None,
            job_execution_id: Some(job_execution_id),
            step_name: step_name.into(),
            status: BatchStatus::Starting,
            read_count: 0,
            write_count: 0,
            commit_count: 0,
            rollback_count: 0,
            read_skip_count: 0,
            process_skip_count: 0,
            write_skip_count: 0,
            filter_count: 0,
            start_time: Utc::now(),
            end_time: None,
            last_updated: None,
            execution_context: ExecutionContext::new(),
            exit_status: ExitStatus::executing(),
            terminate_only: false,
            failure_exceptions: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn add_failure_exception(&mut self, error: anyhow::Error) {
        self.failure_exceptions.push(Arc::new(error));
    }
}
