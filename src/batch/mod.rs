//! # Batch Step Projection
//!
//! A flattened, serializable [`StepExecutionEvent`] built from a batch
//! engine's [`StepExecution`], along with the [`BatchStatus`] order that keeps
//! a recorded failure from being overwritten by a later success.

pub mod status;
pub mod step_execution;
pub mod step_execution_event;

pub use status::{BatchStatus, ExitStatus};
pub use step_execution::{ExecutionContext, FailureCause, StepExecution};
pub use step_execution_event::StepExecutionEvent;
