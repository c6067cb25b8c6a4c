//! # Dialect Paging Providers
//!
//! One [`PagingQueryProvider`] per bounding technique:
//!
//! - [`LimitPagingQueryProvider`] - `LIMIT n OFFSET m` (PostgreSQL, MySQL, H2, HSQLDB)
//! - [`TopPagingQueryProvider`] - `SELECT TOP n` with a `ROW_NUMBER()` window for jumps (SQL Server)
//! - [`RowNumPagingQueryProvider`] - nested `ROWNUM` filtering (Oracle-class systems
//!   without native offset support)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::pagination::{
    generate_limit_query, generate_row_num_query_with_nesting, generate_row_number_window_query,
    generate_top_query, row_num_window, PagingQuery,
};
use crate::error::TaskRepositoryError;
use crate::models::PageRequest;

/// Renders bounded, ordered queries for one database dialect
pub trait PagingQueryProvider: Send + Sync + fmt::Debug {
    /// Query for the first `page_size` rows
    fn first_page_query(&self, query: &PagingQuery, page_size: u32) -> String;

    /// Query for the next `page_size` rows after the last row already seen.
    ///
    /// The sort-key placeholders (`:_<key>`) must be bound to the values of
    /// that row.
    fn remaining_page_query(&self, query: &PagingQuery, page_size: u32) -> String;

    /// Query for an arbitrary window
    fn page_query(&self, query: &PagingQuery, request: &PageRequest) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LimitPagingQueryProvider;

impl PagingQueryProvider for LimitPagingQueryProvider {
    fn first_page_query(&self, query: &PagingQuery, page_size: u32) -> String {
        generate_limit_query(query, false, &format!("LIMIT {page_size}"))
    }

    fn remaining_page_query(&self, query: &PagingQuery, page_size: u32) -> String {
        generate_limit_query(query, true, &format!("LIMIT {page_size}"))
    }

    fn page_query(&self, query: &PagingQuery, request: &PageRequest) -> String {
        generate_limit_query(
            query,
            false,
            &format!("LIMIT {} OFFSET {}", request.page_size(), request.offset()),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TopPagingQueryProvider;

impl PagingQueryProvider for TopPagingQueryProvider {
    fn first_page_query(&self, query: &PagingQuery, page_size: u32) -> String {
        generate_top_query(query, false, &format!("TOP {page_size}"))
    }

    fn remaining_page_query(&self, query: &PagingQuery, page_size: u32) -> String {
        generate_top_query(query, true, &format!("TOP {page_size}"))
    }

    fn page_query(&self, query: &PagingQuery, request: &PageRequest) -> String {
        generate_row_number_window_query(
            query,
            &row_num_window(request.offset(), request.page_size()),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RowNumPagingQueryProvider;

impl PagingQueryProvider for RowNumPagingQueryProvider {
    fn first_page_query(&self, query: &PagingQuery, page_size: u32) -> String {
        generate_row_num_query_with_nesting(query, false, &format!("ROWNUM <= {page_size}"))
    }

    fn remaining_page_query(&self, query: &PagingQuery, page_size: u32) -> String {
        generate_row_num_query_with_nesting(query, true, &format!("ROWNUM <= {page_size}"))
    }

    fn page_query(&self, query: &PagingQuery, request: &PageRequest) -> String {
        generate_row_num_query_with_nesting(
            query,
            false,
            &row_num_window(request.offset(), request.page_size()),
        )
    }
}

/// Databases with a known paging technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseDialect {
    Postgres,
    MySql,
    H2,
    Hsql,
    SqlServer,
    Oracle,
}

impl DatabaseDialect {
    /// Infer the dialect from a connection URL scheme
    pub fn from_url(url: &str) -> Result<Self, TaskRepositoryError> {
        let scheme = url
            .trim_start_matches("jdbc:")
            .split(':')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        scheme.parse()
    }

    pub fn paging_provider(self) -> Box<dyn PagingQueryProvider> {
        match self {
            DatabaseDialect::Postgres
            | DatabaseDialect::MySql
            | DatabaseDialect::H2
            | DatabaseDialect::Hsql => Box::new(LimitPagingQueryProvider),
            DatabaseDialect::SqlServer => Box::new(TopPagingQueryProvider),
            DatabaseDialect::Oracle => Box::new(RowNumPagingQueryProvider),
        }
    }
}

impl FromStr for DatabaseDialect {
    type Err = TaskRepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DatabaseDialect::Postgres),
            "mysql" | "mariadb" => Ok(DatabaseDialect::MySql),
            "h2" => Ok(DatabaseDialect::H2),
            "hsql" | "hsqldb" => Ok(DatabaseDialect::Hsql),
            "sqlserver" | "mssql" => Ok(DatabaseDialect::SqlServer),
            "oracle" => Ok(DatabaseDialect::Oracle),
            other => Err(TaskRepositoryError::configuration(format!(
                "unsupported database dialect: {other}"
            ))),
        }
    }
}

impl fmt::Display for DatabaseDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatabaseDialect::Postgres => "postgres",
            DatabaseDialect::MySql => "mysql",
            DatabaseDialect::H2 => "h2",
            DatabaseDialect::Hsql => "hsql",
            DatabaseDialect::SqlServer => "sqlserver",
            DatabaseDialect::Oracle => "oracle",
        };
        f.write_str(name)
    }
}
