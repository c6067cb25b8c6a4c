use taskexec_core::models::PageRequest;
use taskexec_core::query_builder::{
    DatabaseDialect, LimitPagingQueryProvider, PagingQuery, PagingQueryProvider,
    RowNumPagingQueryProvider, SortKeys, TopPagingQueryProvider,
};
use taskexec_core::repository::dao::TaskExecutionQueries;

fn by_name_query() -> PagingQuery {
    PagingQuery::new("TASK_EXECUTION_ID, TASK_NAME", "TASK_EXECUTION")
        .where_clause("TASK_NAME = $1")
        .sort_keys(SortKeys::new().asc("START_TIME").asc("TASK_EXECUTION_ID"))
}

#[test]
fn test_limit_page_query() {
    let request = PageRequest::new(20, 10).unwrap();
    assert_eq!(
        LimitPagingQueryProvider.page_query(&by_name_query(), &request),
        "SELECT TASK_EXECUTION_ID, TASK_NAME FROM TASK_EXECUTION WHERE TASK_NAME = $1 \
         ORDER BY START_TIME ASC, TASK_EXECUTION_ID ASC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_limit_first_page_query() {
    assert_eq!(
        LimitPagingQueryProvider.first_page_query(&by_name_query(), 5),
        "SELECT TASK_EXECUTION_ID, TASK_NAME FROM TASK_EXECUTION WHERE TASK_NAME = $1 \
         ORDER BY START_TIME ASC, TASK_EXECUTION_ID ASC LIMIT 5"
    );
}

#[test]
fn test_top_first_page_query() {
    assert_eq!(
        TopPagingQueryProvider.first_page_query(&by_name_query(), 5),
        "SELECT TOP 5 TASK_EXECUTION_ID, TASK_NAME FROM TASK_EXECUTION WHERE TASK_NAME = $1 \
         ORDER BY START_TIME ASC, TASK_EXECUTION_ID ASC"
    );
}

#[test]
fn test_top_page_query_uses_row_number_window() {
    let request = PageRequest::new(10, 5).unwrap();
    let sql = TopPagingQueryProvider.page_query(&by_name_query(), &request);
    assert!(sql.contains(
        "ROW_NUMBER() OVER (ORDER BY START_TIME ASC, TASK_EXECUTION_ID ASC) AS TMP_ROW_NUM"
    ));
    assert!(sql.ends_with("PAGED_ROWS WHERE TMP_ROW_NUM >= 11 AND TMP_ROW_NUM < 16"));
}

#[test]
fn test_row_num_page_window() {
    let request = PageRequest::new(10, 5).unwrap();
    assert_eq!(
        RowNumPagingQueryProvider.page_query(&by_name_query(), &request),
        "SELECT TASK_EXECUTION_ID, TASK_NAME FROM (SELECT TASK_EXECUTION_ID, TASK_NAME, \
         ROWNUM as TMP_ROW_NUM FROM (SELECT TASK_EXECUTION_ID, TASK_NAME FROM TASK_EXECUTION \
         WHERE TASK_NAME = $1 ORDER BY START_TIME ASC, TASK_EXECUTION_ID ASC)) \
         WHERE TMP_ROW_NUM >= 11 AND TMP_ROW_NUM < 16"
    );
}

#[test]
fn test_row_num_remaining_page_wraps_filter() {
    let sql = RowNumPagingQueryProvider.remaining_page_query(&by_name_query(), 5);
    assert!(sql.contains(
        "WHERE (TASK_NAME = $1) AND ((START_TIME > :_START_TIME) OR \
         (START_TIME = :_START_TIME AND TASK_EXECUTION_ID > :_TASK_EXECUTION_ID))"
    ));
    assert!(sql.ends_with("WHERE ROWNUM <= 5"));
}

#[test]
fn test_remaining_page_without_filter() {
    let query = PagingQuery::new("*", "TASK_EXECUTION")
        .sort_keys(SortKeys::new().desc("START_TIME"));
    assert_eq!(
        LimitPagingQueryProvider.remaining_page_query(&query, 3),
        "SELECT * FROM TASK_EXECUTION WHERE ((START_TIME < :_START_TIME)) \
         ORDER BY START_TIME DESC LIMIT 3"
    );
}

#[test]
fn test_unspecified_direction_defaults_to_ascending() {
    let query = PagingQuery::new("*", "T").sort_keys(SortKeys::new().key("ID", None));
    assert_eq!(
        LimitPagingQueryProvider.first_page_query(&query, 1),
        "SELECT * FROM T ORDER BY ID ASC LIMIT 1"
    );
}

#[test]
fn test_dialect_detection_and_providers() {
    let cases = [
        ("postgres://localhost/tasks", DatabaseDialect::Postgres, "LIMIT"),
        ("postgresql://localhost/tasks", DatabaseDialect::Postgres, "LIMIT"),
        ("mysql://localhost/tasks", DatabaseDialect::MySql, "LIMIT"),
        ("jdbc:h2:mem:tasks", DatabaseDialect::H2, "LIMIT"),
        ("jdbc:hsqldb:mem:tasks", DatabaseDialect::Hsql, "LIMIT"),
        ("jdbc:sqlserver://localhost", DatabaseDialect::SqlServer, "TOP"),
        ("jdbc:oracle:thin:@localhost", DatabaseDialect::Oracle, "ROWNUM"),
    ];

    for (url, dialect, marker) in cases {
        assert_eq!(DatabaseDialect::from_url(url).unwrap(), dialect, "{url}");
        let sql = dialect
            .paging_provider()
            .first_page_query(&by_name_query(), 10);
        assert!(sql.contains(marker), "{dialect}: {sql}");
    }

    assert!(DatabaseDialect::from_url("sqlite::memory:").is_err());
}

#[test]
fn test_execution_queries_render_with_prefix() {
    let queries = TaskExecutionQueries::new("JOB_").unwrap();
    let query = queries.find_all_query();
    let sql = DatabaseDialect::Postgres
        .paging_provider()
        .page_query(&query, &PageRequest::new(0, 10).unwrap());

    assert!(sql.contains("FROM JOB_EXECUTION"));
    assert!(sql.contains("ORDER BY START_TIME DESC, TASK_EXECUTION_ID DESC"));
    assert!(!sql.contains("%PREFIX%"));

    assert!(TaskExecutionQueries::new("JOB; DROP").is_err());
}
