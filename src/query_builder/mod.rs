//! # Query Builder System
//!
//! Bounded, ordered query generation for the durable task execution store.
//!
//! ## Key Components
//!
//! - [`sort`] - Ordered sort-key to direction mapping and ORDER BY rendering
//! - [`pagination`] - Dialect-independent query parts and the shared renderers
//! - [`providers`] - Per-dialect paging strategies and dialect detection
//!
//! ## Example Usage
//!
//! ```rust
//! use taskexec_core::models::PageRequest;
//! use taskexec_core::query_builder::{DatabaseDialect, PagingQuery, SortKeys};
//!
//! let query = PagingQuery::new("*", "TASK_EXECUTION")
//!     .sort_keys(SortKeys::new().desc("START_TIME").desc("TASK_EXECUTION_ID"));
//! let request = PageRequest::new(10, 5).unwrap();
//!
//! let sql = DatabaseDialect::Oracle.paging_provider().page_query(&query, &request);
//! assert!(sql.ends_with("TMP_ROW_NUM >= 11 AND TMP_ROW_NUM < 16"));
//! ```

pub mod pagination;
pub mod providers;
pub mod sort;

pub use pagination::PagingQuery;
pub use providers::{
    DatabaseDialect, LimitPagingQueryProvider, PagingQueryProvider, RowNumPagingQueryProvider,
    TopPagingQueryProvider,
};
pub use sort::{Order, SortKeys};
