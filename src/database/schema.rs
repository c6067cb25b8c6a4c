//! # Task Execution Schema
//!
//! Idempotent DDL for the durable store. Every statement uses
//! `IF NOT EXISTS`, so running [`TaskSchema::init`] against an initialized
//! database is a no-op.

use sqlx::PgPool;
use tracing::info;

use crate::error::{Result, TaskRepositoryError};
use crate::repository::dao::TaskExecutionQueries;

const CREATE_EXECUTION_TABLE: &str = "CREATE TABLE IF NOT EXISTS %PREFIX%EXECUTION (
    TASK_EXECUTION_ID BIGINT NOT NULL PRIMARY KEY,
    START_TIME TIMESTAMPTZ NOT NULL,
    END_TIME TIMESTAMPTZ,
    TASK_NAME TEXT NOT NULL,
    EXIT_CODE INTEGER,
    EXIT_MESSAGE TEXT
)";

const CREATE_PARAMS_TABLE: &str = "CREATE TABLE IF NOT EXISTS %PREFIX%EXECUTION_PARAMS (
    TASK_EXECUTION_ID BIGINT NOT NULL REFERENCES %PREFIX%EXECUTION (TASK_EXECUTION_ID),
    PARAM_INDEX INTEGER NOT NULL,
    TASK_PARAM TEXT NOT NULL,
    PRIMARY KEY (TASK_EXECUTION_ID, PARAM_INDEX)
)";

const CREATE_SEQUENCE: &str = "CREATE SEQUENCE IF NOT EXISTS %PREFIX%SEQ MINVALUE 0 START WITH 0";

const CREATE_NAME_INDEX: &str = "CREATE INDEX IF NOT EXISTS %PREFIX%EXECUTION_NAME_IDX \
    ON %PREFIX%EXECUTION (TASK_NAME, START_TIME, TASK_EXECUTION_ID)";

#[derive(Debug, Clone)]
pub struct TaskSchema {
    queries: TaskExecutionQueries,
}

impl TaskSchema {
    pub fn new(table_prefix: &str) -> Result<Self> {
        Ok(Self {
            queries: TaskExecutionQueries::new(table_prefix)?,
        })
    }

    /// DDL statements in execution order
    pub fn statements(&self) -> Vec<String> {
        [
            CREATE_EXECUTION_TABLE,
            CREATE_PARAMS_TABLE,
            CREATE_SEQUENCE,
            CREATE_NAME_INDEX,
        ]
        .iter()
        .map(|template| self.queries.render(template))
        .collect()
    }

    /// Create tables, index and sequence if they are missing
    pub async fn init(&self, pool: &PgPool) -> Result<()> {
        for statement in self.statements() {
            sqlx::query(&statement)
                .execute(pool)
                .await
                .map_err(|e| TaskRepositoryError::from_sqlx("init_schema", None, e))?;
        }

        info!(
            table_prefix = %self.queries.table_prefix(),
            "Task execution schema ready"
        );
        Ok(())
    }
}
