//! # SQL Task Execution DAO
//!
//! PostgreSQL-backed implementation of [`TaskExecutionDao`] over a
//! [`PgPool`], with ids drawn from a database sequence.
//!
//! ## Schema
//!
//! All names carry a configurable prefix (default `TASK_`):
//! - `<prefix>EXECUTION` - one row per execution
//! - `<prefix>EXECUTION_PARAMS` - one row per argument, keyed by
//!   `(TASK_EXECUTION_ID, PARAM_INDEX)` so the argument order survives
//! - `<prefix>SEQ` - id sequence
//!
//! ## Consistency
//!
//! `save` writes the execution row and all parameter rows in one
//! transaction; readers never observe an execution without its parameters.
//! Reads use the default isolation level, so repeated page fetches may see
//! phantoms.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::TaskExecutionDao;
use crate::constants::schema;
use crate::error::{Result, TaskRepositoryError};
use crate::logging::{log_database_operation, log_error};
use crate::models::{Page, PageRequest, TaskExecution};
use crate::query_builder::{DatabaseDialect, PagingQuery, PagingQueryProvider, SortKeys};
use crate::repository::id_allocator::{ExecutionIdAllocator, SequenceIdAllocator};

const SAVE_TASK_EXECUTION: &str = "INSERT INTO %PREFIX%EXECUTION \
    (TASK_EXECUTION_ID, START_TIME, END_TIME, TASK_NAME, EXIT_CODE, EXIT_MESSAGE) \
    VALUES ($1, $2, $3, $4, $5, $6)";

const SAVE_TASK_PARAMETER: &str = "INSERT INTO %PREFIX%EXECUTION_PARAMS \
    (TASK_EXECUTION_ID, PARAM_INDEX, TASK_PARAM) VALUES ($1, $2, $3)";

const UPDATE_TASK_EXECUTION: &str = "UPDATE %PREFIX%EXECUTION \
    SET END_TIME = $1, EXIT_CODE = $2, EXIT_MESSAGE = $3 \
    WHERE TASK_EXECUTION_ID = $4 AND (END_TIME IS NULL OR $1 IS NOT NULL)";

const GET_EXECUTION_BY_ID: &str = "SELECT TASK_EXECUTION_ID, START_TIME, END_TIME, TASK_NAME, \
    EXIT_CODE, EXIT_MESSAGE FROM %PREFIX%EXECUTION WHERE TASK_EXECUTION_ID = $1";

const EXECUTION_EXISTS: &str =
    "SELECT COUNT(*) FROM %PREFIX%EXECUTION WHERE TASK_EXECUTION_ID = $1";

const GET_PARAMETERS: &str = "SELECT TASK_EXECUTION_ID, TASK_PARAM FROM %PREFIX%EXECUTION_PARAMS \
    WHERE TASK_EXECUTION_ID = ANY($1) ORDER BY TASK_EXECUTION_ID, PARAM_INDEX";

const TASK_EXECUTION_COUNT: &str = "SELECT COUNT(*) FROM %PREFIX%EXECUTION";

const TASK_EXECUTION_COUNT_BY_NAME: &str =
    "SELECT COUNT(*) FROM %PREFIX%EXECUTION WHERE TASK_NAME = $1";

const RUNNING_TASK_EXECUTION_COUNT_BY_NAME: &str =
    "SELECT COUNT(*) FROM %PREFIX%EXECUTION WHERE TASK_NAME = $1 AND END_TIME IS NULL";

const FIND_TASK_NAMES: &str =
    "SELECT DISTINCT TASK_NAME FROM %PREFIX%EXECUTION ORDER BY TASK_NAME";

const BY_NAME_WHERE: &str = "TASK_NAME = $1";

const RUNNING_BY_NAME_WHERE: &str = "TASK_NAME = $1 AND END_TIME IS NULL";

/// SQL text for one table prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskExecutionQueries {
    table_prefix: String,
}

impl TaskExecutionQueries {
    /// Table prefixes are spliced into SQL text, so only ASCII letters,
    /// digits and underscores are accepted.
    pub fn new(table_prefix: &str) -> Result<Self> {
        validate_table_prefix(table_prefix)?;
        Ok(Self {
            table_prefix: table_prefix.to_string(),
        })
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    pub fn execution_table(&self) -> String {
        format!("{}{}", self.table_prefix, schema::EXECUTION_TABLE)
    }

    pub fn params_table(&self) -> String {
        format!("{}{}", self.table_prefix, schema::EXECUTION_PARAMS_TABLE)
    }

    pub fn sequence_name(&self) -> String {
        format!("{}{}", self.table_prefix, schema::SEQUENCE)
    }

    /// Substitute the table prefix into a query template
    pub fn render(&self, template: &str) -> String {
        template.replace(schema::PREFIX_PLACEHOLDER, &self.table_prefix)
    }

    pub fn save_execution(&self) -> String {
        self.render(SAVE_TASK_EXECUTION)
    }

    pub fn save_parameter(&self) -> String {
        self.render(SAVE_TASK_PARAMETER)
    }

    pub fn update_execution(&self) -> String {
        self.render(UPDATE_TASK_EXECUTION)
    }

    pub fn get_execution(&self) -> String {
        self.render(GET_EXECUTION_BY_ID)
    }

    pub fn execution_exists(&self) -> String {
        self.render(EXECUTION_EXISTS)
    }

    pub fn get_parameters(&self) -> String {
        self.render(GET_PARAMETERS)
    }

    pub fn count_all(&self) -> String {
        self.render(TASK_EXECUTION_COUNT)
    }

    pub fn count_by_name(&self) -> String {
        self.render(TASK_EXECUTION_COUNT_BY_NAME)
    }

    pub fn count_running_by_name(&self) -> String {
        self.render(RUNNING_TASK_EXECUTION_COUNT_BY_NAME)
    }

    pub fn task_names(&self) -> String {
        self.render(FIND_TASK_NAMES)
    }

    /// Oldest first: `START_TIME ASC, TASK_EXECUTION_ID ASC`
    pub fn chronological_sort() -> SortKeys {
        SortKeys::new()
            .asc(schema::START_TIME)
            .asc(schema::EXECUTION_ID)
    }

    fn paging_query(&self, where_clause: Option<&str>, sort_keys: SortKeys) -> PagingQuery {
        let query = PagingQuery::new(schema::EXECUTION_COLUMNS, &self.execution_table())
            .sort_keys(sort_keys);
        match where_clause {
            Some(clause) => query.where_clause(clause),
            None => query,
        }
    }

    pub fn find_by_name_query(&self) -> PagingQuery {
        self.paging_query(Some(BY_NAME_WHERE), Self::chronological_sort())
    }

    pub fn find_running_by_name_query(&self) -> PagingQuery {
        self.paging_query(Some(RUNNING_BY_NAME_WHERE), Self::chronological_sort())
    }

    /// Most recent first: `START_TIME DESC, TASK_EXECUTION_ID DESC`
    pub fn find_all_query(&self) -> PagingQuery {
        self.paging_query(None, Self::chronological_sort().reversed())
    }
}

/// Only PostgreSQL paging SQL is executable on a `PgPool`
pub(crate) fn ensure_supported_dialect(dialect: DatabaseDialect) -> Result<()> {
    if dialect != DatabaseDialect::Postgres {
        return Err(TaskRepositoryError::configuration(format!(
            "dialect '{dialect}' cannot be used with the PostgreSQL task execution store"
        )));
    }
    Ok(())
}

pub(crate) fn validate_table_prefix(table_prefix: &str) -> Result<()> {
    if table_prefix.is_empty()
        || !table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(TaskRepositoryError::configuration(format!(
            "invalid table prefix '{table_prefix}': use ASCII letters, digits and underscores"
        )));
    }
    Ok(())
}

#[derive(Debug, FromRow)]
struct TaskExecutionRow {
    task_execution_id: i64,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    task_name: String,
    exit_code: Option<i32>,
    exit_message: Option<String>,
}

impl TaskExecutionRow {
    fn into_execution(self, parameters: Vec<String>) -> TaskExecution {
        TaskExecution {
            execution_id: self.task_execution_id,
            task_name: self.task_name,
            start_time: self.start_time,
            end_time: self.end_time,
            exit_code: self.exit_code,
            exit_message: self.exit_message,
            parameters,
        }
    }
}

#[derive(Debug, FromRow)]
struct TaskParameterRow {
    task_execution_id: i64,
    task_param: String,
}

pub struct SqlTaskExecutionDao {
    pool: PgPool,
    queries: TaskExecutionQueries,
    paging: Box<dyn PagingQueryProvider>,
    id_allocator: Arc<dyn ExecutionIdAllocator>,
}

impl std::fmt::Debug for SqlTaskExecutionDao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlTaskExecutionDao")
            .field("queries", &self.queries)
            .field("paging", &self.paging)
            .field("id_allocator", &"<Arc<dyn ExecutionIdAllocator>>")
            .finish()
    }
}

impl SqlTaskExecutionDao {
    /// PostgreSQL paging with the default `TASK_` prefix
    pub fn new(pool: PgPool) -> Result<Self> {
        Self::with_options(pool, schema::DEFAULT_TABLE_PREFIX, DatabaseDialect::Postgres)
    }

    /// Fails with `Configuration` for any dialect but PostgreSQL, since the
    /// paging SQL runs on the pool
    pub fn with_options(pool: PgPool, table_prefix: &str, dialect: DatabaseDialect) -> Result<Self> {
        ensure_supported_dialect(dialect)?;
        let queries = TaskExecutionQueries::new(table_prefix)?;
        let id_allocator = Arc::new(SequenceIdAllocator::new(
            pool.clone(),
            queries.sequence_name(),
        ));

        Ok(Self {
            pool,
            queries,
            paging: dialect.paging_provider(),
            id_allocator,
        })
    }

    pub fn queries(&self) -> &TaskExecutionQueries {
        &self.queries
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn count_with_name(&self, sql: &str, task_name: &str, operation: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(sql)
            .bind(task_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TaskRepositoryError::from_sqlx(operation, None, e))?;
        Ok(count as u64)
    }

    /// Attach ordered parameters to a batch of execution rows
    async fn hydrate(&self, rows: Vec<TaskExecutionRow>) -> Result<Vec<TaskExecution>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.task_execution_id).collect();
        let parameter_rows: Vec<TaskParameterRow> =
            sqlx::query_as(&self.queries.get_parameters())
                .bind(&ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| TaskRepositoryError::from_sqlx("get_parameters", None, e))?;

        let mut parameters: HashMap<i64, Vec<String>> = HashMap::new();
        for row in parameter_rows {
            parameters
                .entry(row.task_execution_id)
                .or_default()
                .push(row.task_param);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let params = parameters.remove(&row.task_execution_id).unwrap_or_default();
                row.into_execution(params)
            })
            .collect())
    }

    async fn fetch_page(
        &self,
        query: PagingQuery,
        task_name: Option<&str>,
        count_sql: String,
        request: &PageRequest,
        operation: &str,
    ) -> Result<Page<TaskExecution>> {
        let page_sql = self.paging.page_query(&query, request);
        debug!(operation, sql = %page_sql, "Fetching task execution page");

        let mut rows_query = sqlx::query_as::<Postgres, TaskExecutionRow>(&page_sql);
        let mut count_query = sqlx::query_scalar::<Postgres, i64>(&count_sql);
        if let Some(name) = task_name {
            rows_query = rows_query.bind(name);
            count_query = count_query.bind(name);
        }

        let (rows, total) = futures::try_join!(
            rows_query.fetch_all(&self.pool),
            count_query.fetch_one(&self.pool)
        )
        .map_err(|e| TaskRepositoryError::from_sqlx(operation, None, e))?;

        let content = self.hydrate(rows).await?;
        Ok(Page::new(content, request, total as u64))
    }

    async fn insert_execution(&self, execution: &TaskExecution) -> Result<()> {
        let execution_id = execution.execution_id;
        let classify = |e| TaskRepositoryError::from_sqlx("save", Some(execution_id), e);

        let mut tx = self.pool.begin().await.map_err(classify)?;

        sqlx::query(&self.queries.save_execution())
            .bind(execution_id)
            .bind(execution.start_time)
            .bind(execution.end_time)
            .bind(&execution.task_name)
            .bind(execution.exit_code)
            .bind(&execution.exit_message)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

        let insert_parameter = self.queries.save_parameter();
        for (index, parameter) in execution.parameters.iter().enumerate() {
            sqlx::query(&insert_parameter)
                .bind(execution_id)
                .bind(index as i32)
                .bind(parameter)
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
        }

        tx.commit().await.map_err(classify)?;

        info!(
            execution_id,
            task_name = %execution.task_name,
            parameters = execution.parameters.len(),
            "Saved task execution"
        );
        Ok(())
    }

    async fn update_execution(&self, execution: &TaskExecution) -> Result<()> {
        let execution_id = execution.execution_id;
        let result = sqlx::query(&self.queries.update_execution())
            .bind(execution.end_time)
            .bind(execution.exit_code)
            .bind(&execution.exit_message)
            .bind(execution_id)
            .execute(&self.pool)
            .await
            .map_err(|e| TaskRepositoryError::from_sqlx("update", Some(execution_id), e))?;

        if result.rows_affected() == 0 {
            let existing: i64 = sqlx::query_scalar(&self.queries.execution_exists())
                .bind(execution_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| TaskRepositoryError::from_sqlx("update", Some(execution_id), e))?;

            return Err(if existing == 0 {
                TaskRepositoryError::NotFound { execution_id }
            } else {
                TaskRepositoryError::invalid_argument(format!(
                    "end time of task execution {execution_id} cannot be cleared"
                ))
            });
        }

        info!(
            execution_id,
            exit_code = execution.exit_code,
            "Updated task execution"
        );
        Ok(())
    }

    /// Run a write, reporting its outcome and duration
    async fn record_write<F>(
        &self,
        operation: &str,
        table: &str,
        execution_id: i64,
        write: F,
    ) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        let started = Instant::now();
        let result = write.await;
        let status = if result.is_ok() { "ok" } else { "error" };
        log_database_operation(
            operation,
            Some(table),
            Some(execution_id),
            status,
            Some(started.elapsed().as_millis() as u64),
            None,
        );
        if let Err(error) = &result {
            log_error(
                "sql_task_execution_dao",
                operation,
                &error.to_string(),
                Some(format!("execution_id={execution_id}").as_str()),
            );
        }
        result
    }
}

#[async_trait]
impl TaskExecutionDao for SqlTaskExecutionDao {
    async fn save(&self, execution: &TaskExecution) -> Result<()> {
        self.record_write(
            "save",
            &self.queries.execution_table(),
            execution.execution_id,
            self.insert_execution(execution),
        )
        .await
    }

    async fn update(&self, execution: &TaskExecution) -> Result<()> {
        self.record_write(
            "update",
            &self.queries.execution_table(),
            execution.execution_id,
            self.update_execution(execution),
        )
        .await
    }

    async fn get(&self, execution_id: i64) -> Result<Option<TaskExecution>> {
        let row: Option<TaskExecutionRow> = sqlx::query_as(&self.queries.get_execution())
            .bind(execution_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TaskRepositoryError::from_sqlx("get", Some(execution_id), e))?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn count_by_name(&self, task_name: &str) -> Result<u64> {
        self.count_with_name(&self.queries.count_by_name(), task_name, "count_by_name")
            .await
    }

    async fn count_running_by_name(&self, task_name: &str) -> Result<u64> {
        self.count_with_name(
            &self.queries.count_running_by_name(),
            task_name,
            "count_running_by_name",
        )
        .await
    }

    async fn count_all(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&self.queries.count_all())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TaskRepositoryError::from_sqlx("count_all", None, e))?;
        Ok(count as u64)
    }

    async fn find_running_by_name(
        &self,
        task_name: &str,
        request: &PageRequest,
    ) -> Result<Page<TaskExecution>> {
        self.fetch_page(
            self.queries.find_running_by_name_query(),
            Some(task_name),
            self.queries.count_running_by_name(),
            request,
            "find_running_by_name",
        )
        .await
    }

    async fn find_by_name(
        &self,
        task_name: &str,
        request: &PageRequest,
    ) -> Result<Page<TaskExecution>> {
        self.fetch_page(
            self.queries.find_by_name_query(),
            Some(task_name),
            self.queries.count_by_name(),
            request,
            "find_by_name",
        )
        .await
    }

    async fn list_distinct_task_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(&self.queries.task_names())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TaskRepositoryError::from_sqlx("list_distinct_task_names", None, e))
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<TaskExecution>> {
        self.fetch_page(
            self.queries.find_all_query(),
            None,
            self.queries.count_all(),
            request,
            "find_all",
        )
        .await
    }

    async fn next_execution_id(&self) -> Result<i64> {
        self.id_allocator.next_execution_id().await
    }
}
