use chrono::Utc;
use taskexec_core::error::TaskRepositoryError;
use taskexec_core::models::{PageRequest, TaskExecution};
use taskexec_core::repository::TaskConfigurer;

use crate::common::TaskExecutionBuilder;

#[tokio::test]
async fn test_create_and_complete_execution() {
    let configurer = TaskConfigurer::in_memory();
    let repository = configurer.repository();
    let explorer = configurer.explorer();

    let id = repository.get_next_execution_id().await.unwrap();
    let mut execution = TaskExecution::new(id, "import", Utc::now(), vec!["--full".into()]);
    repository.create_task_execution(&execution).await.unwrap();
    assert_eq!(
        explorer.get_running_task_execution_count_by_task_name("import").await.unwrap(),
        1
    );

    execution.complete(Utc::now(), 0).unwrap();
    repository.update(&execution).await.unwrap();

    let stored = explorer.get_task_execution(id).await.unwrap().unwrap();
    assert_eq!(stored, execution);
    assert!(!stored.is_running());
    assert_eq!(
        explorer.get_running_task_execution_count_by_task_name("import").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_ids_increase_per_store() {
    let first = TaskConfigurer::in_memory().repository();
    let second = TaskConfigurer::in_memory().repository();

    assert_eq!(first.get_next_execution_id().await.unwrap(), 0);
    assert_eq!(first.get_next_execution_id().await.unwrap(), 1);
    assert_eq!(second.get_next_execution_id().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_duplicate_fails() {
    let repository = TaskConfigurer::in_memory().repository();
    let execution = TaskExecutionBuilder::new(3).build();
    repository.create_task_execution(&execution).await.unwrap();

    assert!(matches!(
        repository.create_task_execution(&execution).await,
        Err(TaskRepositoryError::DuplicateKey { execution_id: 3 })
    ));
}

#[tokio::test]
async fn test_update_requires_existing_execution() {
    let repository = TaskConfigurer::in_memory().repository();
    let execution = TaskExecutionBuilder::new(9).ended_at(1, 0).build();

    assert!(matches!(
        repository.update(&execution).await,
        Err(TaskRepositoryError::NotFound { execution_id: 9 })
    ));
}

#[tokio::test]
async fn test_failed_execution_keeps_message() {
    let configurer = TaskConfigurer::in_memory();
    let repository = configurer.repository();

    let mut execution = TaskExecutionBuilder::new(0).named("export").build();
    repository.create_task_execution(&execution).await.unwrap();

    execution
        .fail(Utc::now(), 1, "Error: disk full\n\nCaused by:\n    No space left")
        .unwrap();
    repository.update(&execution).await.unwrap();

    let page = configurer
        .explorer()
        .find_task_executions_by_name("export", &PageRequest::first(1).unwrap())
        .await
        .unwrap();
    let stored = &page.content()[0];
    assert_eq!(stored.exit_code, Some(1));
    assert!(stored.exit_message.as_deref().unwrap().contains("No space left"));
}
