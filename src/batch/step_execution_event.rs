//! Serializable snapshot of a [`StepExecution`].
//!
//! The projection is one-way: the event is built from the step and nothing
//! written to the event flows back. Failure causes are transient; they are
//! skipped when serializing and come back as an empty list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::{BatchStatus, ExitStatus};
use super::step_execution::{ExecutionContext, FailureCause, StepExecution};
use crate::error::{Result, TaskRepositoryError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecutionEvent {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub version: Option<i32>,
    pub job_execution_id: i64,
    pub step_name: String,
    #[serde(default)]
    pub status: BatchStatus,
    #[serde(default)]
    pub read_count: u32,
    #[serde(default)]
    pub write_count: u32,
    #[serde(default)]
    pub commit_count: u32,
    #[serde(default)]
    pub rollback_count: u32,
    #[serde(default)]
    pub read_skip_count: u32,
    #[serde(default)]
    pub process_skip_count: u32,
    #[serde(default)]
    pub write_skip_count: u32,
    #[serde(default)]
    pub filter_count: u32,
    #[serde(default = "Utc::now")]
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub execution_context: ExecutionContext,
    #[serde(default)]
    pub exit_status: ExitStatus,
    #[serde(default)]
    pub terminate_only: bool,
    #[serde(skip)]
    failure_exceptions: Vec<FailureCause>,
}

impl StepExecutionEvent {
    /// Fresh event: `STARTING`, exit status `EXECUTING`, started now
    pub fn new(step_name: impl Into<String>, job_execution_id: i64) -> Self {
        Self {
            id: None,
            version: None,
            job_execution_id,
            step_name: step_name.into(),
            status: BatchStatus::default(),
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
            exit_status: ExitStatus::default(),
            terminate_only: false,
            failure_exceptions: Vec::new(),
        }
    }

    /// Raise the status, never lowering it past `STARTED`
    pub fn upgrade_status(&mut self, status: BatchStatus) {
        self.status = self.status.upgrade_to(status);
    }

    /// Read, process and write skips combined
    pub fn skip_count(&self) -> u32 {
        self.read_skip_count
            .saturating_add(self.process_skip_count)
            .saturating_add(self.write_skip_count)
    }

    pub fn increment_commit_count(&mut self) {
        self.commit_count = self.commit_count.saturating_add(1);
    }

    pub fn increment_rollback_count(&mut self) {
        self.rollback_count = self.rollback_count.saturating_add(1);
    }

    pub fn set_terminate_only(&mut self) {
        self.terminate_only = true;
    }

    pub fn is_terminate_only(&self) -> bool {
        self.terminate_only
    }

    pub fn failure_exceptions(&self) -> &[FailureCause] {
        &self.failure_exceptions
    }

    pub fn add_failure_exception(&mut self, cause: FailureCause) {
        self.failure_exceptions.push(cause);
    }

    /// Wire form; failure causes are not included
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "StepExecutionEvent: id={}, version={}, name={}, status={}, exitStatus={}, \
             readCount={}, filterCount={}, writeCount={} readSkipCount={}, writeSkipCount={}, \
             processSkipCount={}, commitCount={}, rollbackCount={}",
            display_opt(self.id),
            display_opt(self.version),
            self.step_name,
            self.status,
            self.exit_status.exit_code,
            self.read_count,
            self.filter_count,
            self.write_count,
            self.read_skip_count,
            self.write_skip_count,
            self.process_skip_count,
            self.commit_count,
            self.rollback_count
        )
    }
}

fn display_opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

impl TryFrom<&StepExecution> for StepExecutionEvent {
    type Error = TaskRepositoryError;

    fn try_from(step: &StepExecution) -> std::result::Result<Self, Self::Error> {
        let job_execution_id = step.job_execution_id.ok_or_else(|| {
            TaskRepositoryError::invalid_argument(format!(
                "step execution {} has no job execution",
                step.step_name
            ))
        })?;

        Ok(Self {
            id: step.id,
            version: step.version,
            job_execution_id,
            step_name: step.step_name.clone(),
            status: step.status,
            read_count: step.read_count,
            write_count: step.write_count,
            commit_count: step.commit_count,
            rollback_count: step.rollback_count,
            read_skip_count: step.read_skip_count,
            process_skip_count: step.process_skip_count,
            write_skip_count: step.write_skip_count,
            filter_count: step.filter_count,
            start_time: step.start_time,
            end_time: step.end_time,
            last_updated: step.last_updated,
            execution_context: step.execution_context.clone(),
            exit_status: step.exit_status.clone(),
            terminate_only: step.terminate_only,
            failure_exceptions: step.failure_exceptions.clone(),
        })
    }
}

impl fmt::Display for StepExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, exitDescription={}",
            self.summary(),
            self.exit_status.exit_description
        )
    }
}

/// Events with an id are equal when id, job execution and step name match;
/// unsaved events are never equal.
impl PartialEq for StepExecutionEvent {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => {
                a == b
                    && self.job_execution_id == other.job_execution_id
                    && self.step_name == other.step_name
            }
            _ => false,
        }
    }
}

impl PartialEq<StepExecution> for StepExecutionEvent {
    fn eq(&self, other: &StepExecution) -> bool {
        self.id.is_some()
            && self.id == other.id
            && Some(self.job_execution_id) == other.job_execution_id
            && self.step_name == other.step_name
    }
}
