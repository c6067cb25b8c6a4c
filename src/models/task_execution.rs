//! # Task Execution Model
//!
//! One run of a task: identity, timing, exit information and the arguments it
//! was started with.
//!
//! ## Lifecycle
//!
//! An execution is created when a task starts (start fields populated, end
//! fields empty) and mutated exactly once more when it completes or fails.
//! `end_time` being `None` is what "running" means; once set it is never
//! cleared.
//!
//! ## Database Schema
//!
//! Maps to the `TASK_EXECUTION` table, with arguments stored row-per-value in
//! `TASK_EXECUTION_PARAMS`:
//! ```sql
//! CREATE TABLE TASK_EXECUTION (
//!   TASK_EXECUTION_ID BIGINT PRIMARY KEY,
//!   START_TIME TIMESTAMPTZ NOT NULL,
//!   END_TIME TIMESTAMPTZ,
//!   TASK_NAME TEXT NOT NULL,
//!   EXIT_CODE INTEGER,
//!   EXIT_MESSAGE TEXT
//! );
//! ```

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{Result, TaskRepositoryError};

/// Fractional digits a `TIMESTAMPTZ` column keeps
const TIMESTAMP_PRECISION: u16 = 6;

/// Truncate to microseconds so both stores hand back the instant they were given
pub fn storage_precision(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(TIMESTAMP_PRECISION)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskExecution {
    pub execution_id: i64,
    pub task_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// `None` until the task has exited
    pub exit_code: Option<i32>,
    pub exit_message: Option<String>,
    pub parameters: Vec<String>,
}

impl TaskExecution {
    /// Create a running execution
    pub fn new(
        execution_id: i64,
        task_name: impl Into<String>,
        start_time: DateTime<Utc>,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            execution_id,
            task_name: task_name.into(),
            start_time: storage_precision(start_time),
            end_time: None,
            exit_code: None,
            exit_message: None,
            parameters,
        }
    }

    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Record a normal exit
    pub fn complete(&mut self, end_time: DateTime<Utc>, exit_code: i32) -> Result<()> {
        self.finish(end_time, exit_code, None)
    }

    /// Record a failed exit along with its diagnostic text
    pub fn fail(
        &mut self,
        end_time: DateTime<Utc>,
        exit_code: i32,
        exit_message: impl Into<String>,
    ) -> Result<()> {
        self.finish(end_time, exit_code, Some(exit_message.into()))
    }

    fn finish(
        &mut self,
        end_time: DateTime<Utc>,
        exit_code: i32,
        exit_message: Option<String>,
    ) -> Result<()> {
        if let Some(existing) = self.end_time {
            return Err(TaskRepositoryError::invalid_argument(format!(
                "task execution {} already ended at {}",
                self.execution_id,
                existing.to_rfc3339()
            )));
        }
        self.end_time = Some(storage_precision(end_time));
        self.exit_code = Some(exit_code);
        if exit_message.is_some() {
            self.exit_message = exit_message;
        }
        Ok(())
    }

    /// Oldest first, ties broken by the lower execution id.
    ///
    /// This is the ordering of name-filtered queries; `find_all` reverses it.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.start_time
            .cmp(&other.start_time)
            .then_with(|| self.execution_id.cmp(&other.execution_id))
    }
}
