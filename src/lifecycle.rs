//! # Task Lifecycle Listener
//!
//! Records one task run: creates the execution when the task starts,
//! remembers a failure if one is reported, and writes the end time and exit
//! status when the task finishes. Each transition is also published as a
//! [`TaskLifecycleEvent`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskexec_core::events::NoopEventPublisher;
//! use taskexec_core::lifecycle::TaskLifecycleListener;
//! use taskexec_core::repository::TaskConfigurer;
//!
//! # async fn run() -> taskexec_core::error::Result<()> {
//! let configurer = TaskConfigurer::in_memory();
//! let listener = TaskLifecycleListener::new(
//!     configurer.repository(),
//!     Arc::new(NoopEventPublisher),
//!     "nightly-import",
//!     std::env::args().skip(1).collect(),
//! );
//!
//! listener.on_start().await?;
//! // ... task body ...
//! listener.on_complete().await?;
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

use crate::constants::exit_codes;
use crate::error::{Result, TaskRepositoryError};
use crate::events::{TaskEventPublisher, TaskLifecycleEvent};
use crate::logging::log_task_operation;
use crate::models::TaskExecution;
use crate::repository::TaskRepository;

#[derive(Debug, Default)]
struct ListenerState {
    execution: Option<TaskExecution>,
    failure: Option<String>,
}

#[derive(Debug)]
pub struct TaskLifecycleListener {
    repository: TaskRepository,
    publisher: Arc<dyn TaskEventPublisher>,
    task_name: String,
    arguments: Vec<String>,
    state: Mutex<ListenerState>,
}

impl TaskLifecycleListener {
    pub fn new(
        repository: TaskRepository,
        publisher: Arc<dyn TaskEventPublisher>,
        task_name: impl Into<String>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            repository,
            publisher,
            task_name: task_name.into(),
            arguments,
            state: Mutex::new(ListenerState::default()),
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Current snapshot, `None` before [`on_start`](Self::on_start)
    pub fn task_execution(&self) -> Option<TaskExecution> {
        self.state.lock().execution.clone()
    }

    /// Allocate an id and persist a running execution
    pub async fn on_start(&self) -> Result<TaskExecution> {
        if let Some(existing) = self.task_execution() {
            return Err(TaskRepositoryError::invalid_argument(format!(
                "task execution {} was already started",
                existing.execution_id
            )));
        }

        let execution_id = self.repository.get_next_execution_id().await?;
        let execution = TaskExecution::new(
            execution_id,
            self.task_name.clone(),
            Utc::now(),
            self.arguments.clone(),
        );
        self.repository.create_task_execution(&execution).await?;

        self.state.lock().execution = Some(execution.clone());
        log_task_operation(
            "start",
            Some(execution_id),
            Some(self.task_name.as_str()),
            "running",
            None,
        );

        self.publish(TaskLifecycleEvent::started(execution.clone()))
            .await;
        Ok(execution)
    }

    /// Remember a failure; it is written when the task completes.
    ///
    /// The exit message is the full cause chain of `error`.
    pub fn on_failure(&self, error: &anyhow::Error) {
        let message = format!("{error:?}");
        warn!(task_name = %self.task_name, error = %error, "Task failed");
        self.state.lock().failure = Some(message);
    }

    /// Record the end time and exit status
    pub async fn on_complete(&self) -> Result<TaskExecution> {
        let (mut execution, failure) = {
            let state = self.state.lock();
            let execution = state.execution.clone().ok_or_else(|| {
                TaskRepositoryError::invalid_argument(format!(
                    "task {} completed before it started",
                    self.task_name
                ))
            })?;
            (execution, state.failure.clone())
        };

        let end_time = Utc::now();
        let failed = failure.is_some();
        match failure {
            Some(message) => execution.fail(end_time, exit_codes::FAILURE, message)?,
            None => execution.complete(end_time, exit_codes::SUCCESS)?,
        }

        self.repository.update(&execution).await?;
        self.state.lock().execution = Some(execution.clone());

        log_task_operation(
            "complete",
            Some(execution.execution_id),
            Some(self.task_name.as_str()),
            if failed { "failed" } else { "completed" },
            execution.exit_message.as_deref(),
        );

        let event = if failed {
            TaskLifecycleEvent::failed(execution.clone())
        } else {
            TaskLifecycleEvent::completed(execution.clone())
        };
        self.publish(event).await;
        Ok(execution)
    }

    async fn publish(&self, event: TaskLifecycleEvent) {
        let name = event.name();
        if let Err(e) = self.publisher.publish(event).await {
            warn!(event = name, error = %e, "Failed to publish lifecycle event");
        }
    }
}
