use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use taskexec_core::models::TaskExecution;
use taskexec_core::repository::TaskExecutionDao;

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Whole-second timestamp offset from a fixed base
pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

/// Task name unique within the test process
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", NAME_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Builder for test executions
pub struct TaskExecutionBuilder {
    execution_id: i64,
    task_name: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    exit_code: Option<i32>,
    exit_message: Option<String>,
    parameters: Vec<String>,
}

impl TaskExecutionBuilder {
    pub fn new(execution_id: i64) -> Self {
        Self {
            execution_id,
            task_name: "test-task".to_string(),
            start_time: at(0),
            end_time: None,
            exit_code: None,
            exit_message: None,
            parameters: Vec::new(),
        }
    }

    pub fn named(mut self, task_name: &str) -> Self {
        self.task_name = task_name.to_string();
        self
    }

    pub fn started_at(mut self, seconds: i64) -> Self {
        self.start_time = at(seconds);
        self
    }

    pub fn ended_at(mut self, seconds: i64, exit_code: i32) -> Self {
        self.end_time = Some(at(seconds));
        self.exit_code = Some(exit_code);
        self
    }

    pub fn with_exit_message(mut self, message: &str) -> Self {
        self.exit_message = Some(message.to_string());
        self
    }

    pub fn with_parameters(mut self, parameters: &[&str]) -> Self {
        self.parameters = parameters.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn build(self) -> TaskExecution {
        TaskExecution {
            execution_id: self.execution_id,
            task_name: self.task_name,
            start_time: self.start_time,
            end_time: self.end_time,
            exit_code: self.exit_code,
            exit_message: self.exit_message,
            parameters: self.parameters,
        }
    }
}

/// Save every execution, panicking on the first failure
pub async fn seed(dao: &dyn TaskExecutionDao, executions: &[TaskExecution]) {
    for execution in executions {
        dao.save(execution)
            .await
            .expect("Failed to seed task execution");
    }
}

pub fn ids(executions: &[TaskExecution]) -> Vec<i64> {
    executions.iter().map(|e| e.execution_id).collect()
}
