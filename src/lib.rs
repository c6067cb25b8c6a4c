#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Task Execution Core
//!
//! Execution tracking for short-lived tasks: identity allocation, lifecycle
//! recording and paged queries over an in-memory or PostgreSQL store.
//!
//! ## Overview
//!
//! Every run of a task becomes a [`TaskExecution`]: it is created with a
//! fresh id when the task starts and written once more when it ends, with
//! its exit code and, on failure, a diagnostic message. Two backends share
//! one [`TaskExecutionDao`](repository::TaskExecutionDao) contract and are
//! interchangeable behind the [`TaskRepository`] and [`TaskExplorer`] façades.
//!
//! ## Module Organization
//!
//! - [`models`] - `TaskExecution`, `PageRequest` and `Page`
//! - [`repository`] - DAO trait, both backends, id allocators and façades
//! - [`query_builder`] - dialect-specific paging query generation
//! - [`database`] - connection pool and schema bootstrap
//! - [`lifecycle`] - records start, failure and completion of a task run
//! - [`events`] - lifecycle event publishing
//! - [`batch`] - step execution projection and status ordering
//! - [`config`] - layered file and environment configuration
//! - [`logging`] - structured `tracing` setup
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use taskexec_core::models::{PageRequest, TaskExecution};
//! use taskexec_core::repository::TaskConfigurer;
//!
//! # async fn example() -> taskexec_core::Result<()> {
//! let configurer = TaskConfigurer::in_memory();
//! let repository = configurer.repository();
//! let explorer = configurer.explorer();
//!
//! let id = repository.get_next_execution_id().await?;
//! let mut execution = TaskExecution::new(id, "nightly-import", Utc::now(), vec![]);
//! repository.create_task_execution(&execution).await?;
//!
//! execution.complete(Utc::now(), 0)?;
//! repository.update(&execution).await?;
//!
//! let page = explorer
//!     .find_task_executions_by_name("nightly-import", &PageRequest::first(20)?)
//!     .await?;
//! assert_eq!(page.total_elements(), 1);
//! # Ok(())
//! # }
//! # tokio_test::block_on(example()).unwrap();
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests; database tests are #[ignore]d
//! ```

pub mod batch;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use batch::{BatchStatus, ExitStatus, StepExecution, StepExecutionEvent};
pub use config::{ConfigManager, TaskCoreConfig};
pub use error::{Result, TaskRepositoryError};
pub use events::{TaskEventPublisher, TaskLifecycleEvent};
pub use lifecycle::TaskLifecycleListener;
pub use models::{Page, PageRequest, TaskExecution};
pub use query_builder::DatabaseDialect;
pub use repository::{TaskConfigurer, TaskExplorer, TaskRepository};
