pub mod page;
pub mod task_execution;

// Re-export core models for easy access
pub use page::{Page, PageRequest};
pub use task_execution::TaskExecution;
