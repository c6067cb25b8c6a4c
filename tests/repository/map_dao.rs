use std::collections::HashSet;
use std::sync::Arc;
use taskexec_core::error::TaskRepositoryError;
use taskexec_core::models::PageRequest;
use taskexec_core::repository::{MapTaskExecutionDao, TaskExecutionDao};

use crate::common::{ids, seed, TaskExecutionBuilder};

#[tokio::test]
async fn test_save_then_get() {
    let dao = MapTaskExecutionDao::new();
    let execution = TaskExecutionBuilder::new(1)
        .with_parameters(&["--foo=bar", "--baz=qux"])
        .build();

    dao.save(&execution).await.unwrap();

    assert_eq!(dao.get(1).await.unwrap(), Some(execution));
    assert_eq!(dao.get(99).await.unwrap(), None);
}

#[tokio::test]
async fn test_duplicate_save_is_rejected() {
    let dao = MapTaskExecutionDao::new();
    let execution = TaskExecutionBuilder::new(1).build();
    dao.save(&execution).await.unwrap();

    let err = dao.save(&execution).await.unwrap_err();
    assert!(matches!(
        err,
        TaskRepositoryError::DuplicateKey { execution_id: 1 }
    ));
}

#[tokio::test]
async fn test_update_unknown_execution_is_not_found() {
    let dao = MapTaskExecutionDao::new();
    let execution = TaskExecutionBuilder::new(5).ended_at(10, 0).build();

    let err = dao.update(&execution).await.unwrap_err();
    assert!(matches!(
        err,
        TaskRepositoryError::NotFound { execution_id: 5 }
    ));
}

#[tokio::test]
async fn test_update_writes_only_exit_fields() {
    let dao = MapTaskExecutionDao::new();
    let original = TaskExecutionBuilder::new(1)
        .named("import")
        .with_parameters(&["--a=1"])
        .build();
    dao.save(&original).await.unwrap();

    let mut updated = TaskExecutionBuilder::new(1)
        .named("renamed")
        .ended_at(30, 1)
        .with_exit_message("boom")
        .build();
    updated.parameters.clear();
    dao.update(&updated).await.unwrap();

    let stored = dao.get(1).await.unwrap().unwrap();
    assert_eq!(stored.task_name, "import");
    assert_eq!(stored.parameters, vec!["--a=1".to_string()]);
    assert_eq!(stored.end_time, updated.end_time);
    assert_eq!(stored.exit_code, Some(1));
    assert_eq!(stored.exit_message.as_deref(), Some("boom"));
}

#[tokio::test]
async fn test_end_time_cannot_be_cleared() {
    let dao = MapTaskExecutionDao::new();
    dao.save(&TaskExecutionBuilder::new(1).ended_at(5, 0).build())
        .await
        .unwrap();

    let err = dao
        .update(&TaskExecutionBuilder::new(1).build())
        .await
        .unwrap_err();
    assert!(matches!(err, TaskRepositoryError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_find_all_is_most_recent_first() {
    let dao = MapTaskExecutionDao::new();
    seed(
        &dao,
        &[
            TaskExecutionBuilder::new(1).started_at(10).build(),
            TaskExecutionBuilder::new(2).started_at(10).build(),
            TaskExecutionBuilder::new(3).started_at(20).build(),
        ],
    )
    .await;

    let page = dao.find_all(&PageRequest::first(10).unwrap()).await.unwrap();
    assert_eq!(ids(page.content()), vec![3, 2, 1]);
}

#[tokio::test]
async fn test_find_by_name_is_oldest_first() {
    let dao = MapTaskExecutionDao::new();
    seed(
        &dao,
        &[
            TaskExecutionBuilder::new(1).named("a").started_at(30).build(),
            TaskExecutionBuilder::new(2).named("b").started_at(10).build(),
            TaskExecutionBuilder::new(3).named("a").started_at(10).build(),
            TaskExecutionBuilder::new(4).named("a").started_at(10).build(),
        ],
    )
    .await;

    let page = dao
        .find_by_name("a", &PageRequest::first(10).unwrap())
        .await
        .unwrap();
    assert_eq!(ids(page.content()), vec![3, 4, 1]);
    assert_eq!(page.total_elements(), 3);
}

#[tokio::test]
async fn test_partial_last_page() {
    let dao = MapTaskExecutionDao::new();
    let executions: Vec<_> = (0..5)
        .map(|id| TaskExecutionBuilder::new(id).started_at(id).build())
        .collect();
    seed(&dao, &executions).await;

    let page = dao
        .find_by_name("test-task", &PageRequest::new(4, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(page.number_of_elements(), 1);
    assert_eq!(page.total_elements(), 5);
    assert_eq!(ids(page.content()), vec![4]);
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[tokio::test]
async fn test_offset_past_end_is_empty() {
    let dao = MapTaskExecutionDao::new();
    seed(&dao, &[TaskExecutionBuilder::new(1).build()]).await;

    let page = dao.find_all(&PageRequest::new(10, 5).unwrap()).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_elements(), 1);
}

#[tokio::test]
async fn test_running_filters_and_counts() {
    let dao = MapTaskExecutionDao::new();
    seed(
        &dao,
        &[
            TaskExecutionBuilder::new(1).named("etl").build(),
            TaskExecutionBuilder::new(2).named("etl").ended_at(5, 0).build(),
            TaskExecutionBuilder::new(3).named("etl").started_at(1).build(),
            TaskExecutionBuilder::new(4).named("report").build(),
        ],
    )
    .await;

    assert_eq!(dao.count_by_name("etl").await.unwrap(), 3);
    assert_eq!(dao.count_running_by_name("etl").await.unwrap(), 2);
    assert_eq!(dao.count_all().await.unwrap(), 4);
    assert_eq!(dao.count_by_name("missing").await.unwrap(), 0);

    let running = dao
        .find_running_by_name("etl", &PageRequest::first(10).unwrap())
        .await
        .unwrap();
    assert_eq!(ids(running.content()), vec![1, 3]);
}

#[tokio::test]
async fn test_task_names_sorted_and_deduplicated() {
    let dao = MapTaskExecutionDao::new();
    seed(
        &dao,
        &[
            TaskExecutionBuilder::new(1).named("zeta").build(),
            TaskExecutionBuilder::new(2).named("alpha").build(),
            TaskExecutionBuilder::new(3).named("zeta").build(),
        ],
    )
    .await;

    assert_eq!(
        dao.list_distinct_task_names().await.unwrap(),
        vec!["alpha".to_string(), "zeta".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_id_allocation_is_unique() {
    let dao = Arc::new(MapTaskExecutionDao::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dao = Arc::clone(&dao);
            tokio::spawn(async move {
                let mut ids = Vec::with_capacity(250);
                for _ in 0..250 {
                    ids.push(dao.next_execution_id().await.unwrap());
                }
                ids
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        let ids = handle.await.unwrap();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        all.extend(ids);
    }

    let unique: HashSet<_> = all.iter().copied().collect();
    assert_eq!(unique.len(), 2000);
    assert_eq!(all.iter().copied().min(), Some(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_all_land() {
    let dao = Arc::new(MapTaskExecutionDao::new());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let dao = Arc::clone(&dao);
            tokio::spawn(async move {
                for _ in 0..50 {
                    let id = dao.next_execution_id().await.unwrap();
                    let execution = TaskExecutionBuilder::new(id)
                        .named(&format!("worker-{worker}"))
                        .build();
                    dao.save(&execution).await.unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(dao.count_all().await.unwrap(), 200);
    assert_eq!(dao.count_by_name("worker-2").await.unwrap(), 50);
    assert_eq!(dao.task_executions().len(), 200);
}
