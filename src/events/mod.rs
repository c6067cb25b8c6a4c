//! # Task Lifecycle Events
//!
//! Fire-and-forget notifications emitted by the
//! [`TaskLifecycleListener`](crate::lifecycle::TaskLifecycleListener) as an
//! execution starts and finishes.
//!
//! ## Key Components
//!
//! - [`TaskLifecycleEvent`] - event payload carrying the execution snapshot
//! - [`TaskEventPublisher`] - sink trait
//! - [`BroadcastEventPublisher`] - `tokio::sync::broadcast` fan-out
//! - [`RecordingEventPublisher`] - in-memory log, useful in tests
//! - [`NoopEventPublisher`] - discards everything

pub mod publisher;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::events;
use crate::models::TaskExecution;

pub use publisher::{
    BroadcastEventPublisher, ChannelEventPublisher, NoopEventPublisher, PublishError,
    RecordingEventPublisher, TaskEventPublisher,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    Started,
    Completed,
    Failed,
}

impl TaskEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started => events::TASK_STARTED,
            Self::Completed => events::TASK_COMPLETED,
            Self::Failed => events::TASK_FAILED,
        }
    }
}

impl fmt::Display for TaskEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLifecycleEvent {
    pub event_id: Uuid,
    pub kind: TaskEventKind,
    pub execution: TaskExecution,
    pub published_at: DateTime<Utc>,
}

impl TaskLifecycleEvent {
    pub fn new(kind: TaskEventKind, execution: TaskExecution) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            execution,
            published_at: Utc::now(),
        }
    }

    pub fn started(execution: TaskExecution) -> Self {
        Self::new(TaskEventKind::Started, execution)
    }

    pub fn completed(execution: TaskExecution) -> Self {
        Self::new(TaskEventKind::Completed, execution)
    }

    pub fn failed(execution: TaskExecution) -> Self {
        Self::new(TaskEventKind::Failed, execution)
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}
