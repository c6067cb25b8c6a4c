//! # Paging Query Generation
//!
//! Shared building blocks for the dialect providers in
//! [`super::providers`]. Each function renders a complete SQL string from a
//! [`PagingQuery`] description; only the bounding technique differs.

use super::sort::{Order, SortKeys};

/// Column alias carrying the computed row number in nested queries
pub const ROW_NUM_ALIAS: &str = "TMP_ROW_NUM";

/// Prefix of the named placeholders used by remaining-page restrictions
pub const SORT_KEY_PARAM_PREFIX: &str = ":_";

/// The dialect-independent parts of a paged query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingQuery {
    select_clause: String,
    from_clause: String,
    where_clause: Option<String>,
    sort_keys: SortKeys,
}

impl PagingQuery {
    pub fn new(select_clause: &str, from_clause: &str) -> Self {
        Self {
            select_clause: select_clause.to_string(),
            from_clause: from_clause.to_string(),
            where_clause: None,
            sort_keys: SortKeys::new(),
        }
    }

    pub fn where_clause(mut self, clause: &str) -> Self {
        self.where_clause = Some(clause.to_string());
        self
    }

    pub fn sort_keys(mut self, sort_keys: SortKeys) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn select(&self) -> &str {
        &self.select_clause
    }

    pub fn from(&self) -> &str {
        &self.from_clause
    }

    pub fn filter(&self) -> Option<&str> {
        self.where_clause.as_deref()
    }

    pub fn keys(&self) -> &SortKeys {
        &self.sort_keys
    }

    /// Body of the ORDER BY clause
    pub fn sort_clause(&self) -> String {
        self.sort_keys.to_sql()
    }
}

/// `SELECT ... ORDER BY ... <limit_clause>`
pub fn generate_limit_query(
    query: &PagingQuery,
    remaining_page_query: bool,
    limit_clause: &str,
) -> String {
    let mut sql = String::new();
    sql.push_str(&format!("SELECT {} FROM {}", query.select(), query.from()));
    build_where_clause(query, remaining_page_query, &mut sql);
    sql.push_str(&format!(" ORDER BY {}", query.sort_clause()));
    sql.push_str(&format!(" {limit_clause}"));
    sql
}

/// `SELECT <top_clause> ... ORDER BY ...`
pub fn generate_top_query(query: &PagingQuery, remaining_page_query: bool, top_clause: &str) -> String {
    let mut sql = String::new();
    sql.push_str(&format!(
        "SELECT {top_clause} {} FROM {}",
        query.select(),
        query.from()
    ));
    build_where_clause(query, remaining_page_query, &mut sql);
    sql.push_str(&format!(" ORDER BY {}", query.sort_clause()));
    sql
}

/// Nest the ordered base query under a ROWNUM pseudo-column and filter on it.
///
/// Used for dialects that number rows only after the inner ORDER BY has been
/// applied (Oracle-class systems).
pub fn generate_row_num_query_with_nesting(
    query: &PagingQuery,
    remaining_page_query: bool,
    row_num_clause: &str,
) -> String {
    let mut sql = String::new();
    sql.push_str(&format!(
        "SELECT {select} FROM (SELECT {select}, ROWNUM as {ROW_NUM_ALIAS} FROM (SELECT {select} FROM {from}",
        select = query.select(),
        from = query.from()
    ));
    build_where_clause(query, remaining_page_query, &mut sql);
    sql.push_str(&format!(" ORDER BY {}", query.sort_clause()));
    sql.push_str(&format!(")) WHERE {row_num_clause}"));
    sql
}

/// Number rows with the `ROW_NUMBER()` window function and filter on it.
pub fn generate_row_number_window_query(query: &PagingQuery, row_num_clause: &str) -> String {
    let mut sql = String::new();
    sql.push_str(&format!(
        "SELECT {select} FROM (SELECT {select}, ROW_NUMBER() OVER (ORDER BY {sort}) AS {ROW_NUM_ALIAS} FROM {from}",
        select = query.select(),
        sort = query.sort_clause(),
        from = query.from()
    ));
    build_where_clause(query, false, &mut sql);
    sql.push_str(&format!(") PAGED_ROWS WHERE {row_num_clause}"));
    sql
}

/// The one-based, half-open row-number window for a zero-based offset
pub fn row_num_window(offset: u64, page_size: u32) -> String {
    let first = offset + 1;
    let end = first + u64::from(page_size);
    format!("{ROW_NUM_ALIAS} >= {first} AND {ROW_NUM_ALIAS} < {end}")
}

/// Restriction that keeps only rows sorting strictly after the last row seen.
///
/// For keys `a ASC, b DESC` this renders
/// `((a > :_a) OR (a = :_a AND b < :_b))`; callers bind the placeholders to
/// the sort-key values of the final row of the previous page.
pub fn build_sort_conditions(sort_keys: &SortKeys) -> String {
    let keys: Vec<(&str, Order)> = sort_keys.iter().collect();
    let mut disjuncts = Vec::with_capacity(keys.len());

    for (index, (name, order)) in keys.iter().enumerate() {
        let mut conjuncts: Vec<String> = keys[..index]
            .iter()
            .map(|(previous, _)| format!("{previous} = {SORT_KEY_PARAM_PREFIX}{previous}"))
            .collect();
        let operator = match order {
            Order::Ascending => ">",
            Order::Descending => "<",
        };
        conjuncts.push(format!("{name} {operator} {SORT_KEY_PARAM_PREFIX}{name}"));
        disjuncts.push(format!("({})", conjuncts.join(" AND ")));
    }

    format!("({})", disjuncts.join(" OR "))
}

fn build_where_clause(query: &PagingQuery, remaining_page_query: bool, sql: &mut String) {
    if remaining_page_query {
        sql.push_str(" WHERE ");
        if let Some(clause) = query.filter() {
            sql.push_str(&format!("({clause}) AND "));
        }
        sql.push_str(&build_sort_conditions(query.keys()));
    } else if let Some(clause) = query.filter() {
        sql.push_str(&format!(" WHERE {clause}"));
    }
}
