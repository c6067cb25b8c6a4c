//! # Execution Id Allocation
//!
//! The only code path that mints execution ids. Every store owns exactly one
//! allocator, created together with the store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

use crate::error::{Result, TaskRepositoryError};

/// Hands out unique, strictly increasing execution ids
#[async_trait]
pub trait ExecutionIdAllocator: Send + Sync {
    async fn next_execution_id(&self) -> Result<i64>;
}

/// In-process counter starting at 0
#[derive(Debug, Default)]
pub struct AtomicIdAllocator {
    current: AtomicI64,
}

impl AtomicIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `initial`
    pub fn starting_at(initial: i64) -> Self {
        Self {
            current: AtomicI64::new(initial),
        }
    }

    /// Synchronous form of [`ExecutionIdAllocator::next_execution_id`]
    pub fn allocate(&self) -> i64 {
        self.current.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionIdAllocator for AtomicIdAllocator {
    async fn next_execution_id(&self) -> Result<i64> {
        Ok(self.allocate())
    }
}

/// Database sequence backed allocator; values survive process restarts
#[derive(Debug, Clone)]
pub struct SequenceIdAllocator {
    pool: PgPool,
    sequence_name: String,
}

impl SequenceIdAllocator {
    pub fn new(pool: PgPool, sequence_name: impl Into<String>) -> Self {
        Self {
            pool,
            sequence_name: sequence_name.into(),
        }
    }

    pub fn sequence_name(&self) -> &str {
        &self.sequence_name
    }
}

#[async_trait]
impl ExecutionIdAllocator for SequenceIdAllocator {
    async fn next_execution_id(&self) -> Result<i64> {
        let next: i64 = sqlx::query_scalar("SELECT nextval($1::regclass)")
            .bind(&self.sequence_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TaskRepositoryError::from_sqlx("next_execution_id", None, e))?;

        debug!(sequence = %self.sequence_name, execution_id = next, "Reserved execution id");
        Ok(next)
    }
}
