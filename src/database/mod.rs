//! # Database Operations
//!
//! Connection pooling and schema bootstrap for the durable task execution
//! store.
//!
//! ## Key Components
//!
//! - [`connection`] - Pool creation from [`crate::config::DatabaseConfig`] and health checks
//! - [`schema`] - Idempotent creation of the execution tables and id sequence

pub mod connection;
pub mod schema;

pub use connection::DatabaseConnection;
pub use schema::TaskSchema;
