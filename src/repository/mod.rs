//! # Task Execution Repository
//!
//! ## Overview
//!
//! Storage for task executions behind a single [`TaskExecutionDao`] trait with
//! two backends: [`MapTaskExecutionDao`] (in-process, `DashMap` + atomic
//! counter) and [`SqlTaskExecutionDao`] (PostgreSQL via `sqlx`, ids from a
//! database sequence).
//!
//! ## Key Components
//!
//! - [`TaskRepository`] - write façade: id allocation, create, update
//! - [`TaskExplorer`] - read-only façade: lookups, counts, paged finds
//! - [`TaskConfigurer`] - selects the backend from configuration and hands
//!   out façades sharing one DAO
//! - [`ExecutionIdAllocator`] - identity source owned by each DAO

pub mod configurer;
pub mod dao;
pub mod id_allocator;
pub mod task_explorer;
pub mod task_repository;

pub use configurer::{StorageBackend, TaskConfigurer};
pub use dao::{MapTaskExecutionDao, SqlTaskExecutionDao, TaskExecutionDao};
pub use id_allocator::{AtomicIdAllocator, ExecutionIdAllocator, SequenceIdAllocator};
pub use task_explorer::TaskExplorer;
pub use task_repository::TaskRepository;
