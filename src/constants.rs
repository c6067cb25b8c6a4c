//! # System Constants
//!
//! Table naming, exit codes and event names shared by the storage backends
//! and the lifecycle listener.

/// Lifecycle events published while a task runs
pub mod events {
    pub const TASK_STARTED: &str = "task.started";
    pub const TASK_COMPLETED: &str = "task.completed";
    pub const TASK_FAILED: &str = "task.failed";
}

/// Exit codes recorded by the lifecycle listener
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Durable schema naming
pub mod schema {
    /// Prefix applied to every table and sequence unless configured otherwise
    pub const DEFAULT_TABLE_PREFIX: &str = "TASK_";

    pub const EXECUTION_TABLE: &str = "EXECUTION";
    pub const EXECUTION_PARAMS_TABLE: &str = "EXECUTION_PARAMS";
    pub const SEQUENCE: &str = "SEQ";

    pub const EXECUTION_COLUMNS: &str =
        "TASK_EXECUTION_ID, START_TIME, END_TIME, TASK_NAME, EXIT_CODE, EXIT_MESSAGE";

    pub const START_TIME: &str = "START_TIME";
    pub const EXECUTION_ID: &str = "TASK_EXECUTION_ID";

    /// Prefix placeholder rewritten by [`crate::repository::dao::SqlTaskExecutionDao`]
    pub const PREFIX_PLACEHOLDER: &str = "%PREFIX%";
}

/// Channel capacity used when nothing is configured
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Connection pool size used when nothing is configured
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
