use std::sync::Arc;
use taskexec_core::events::{BroadcastEventPublisher, TaskEventKind};
use taskexec_core::lifecycle::TaskLifecycleListener;
use taskexec_core::models::{PageRequest, TaskExecution};
use taskexec_core::repository::{TaskConfigurer, TaskExplorer};

const TASK_NAME: &str = "testTask";

fn listener_with(
    configurer: &TaskConfigurer,
    arguments: &[&str],
) -> (TaskLifecycleListener, BroadcastEventPublisher) {
    let publisher = BroadcastEventPublisher::new(16);
    let listener = TaskLifecycleListener::new(
        configurer.repository(),
        Arc::new(publisher.clone()),
        TASK_NAME,
        arguments.iter().map(|a| a.to_string()).collect(),
    );
    (listener, publisher)
}

async fn only_execution(explorer: &TaskExplorer) -> TaskExecution {
    let page = explorer
        .find_task_executions_by_name(TASK_NAME, &PageRequest::first(u32::MAX).unwrap())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 1);
    page.into_content().remove(0)
}

#[tokio::test]
async fn test_task_create() {
    let configurer = TaskConfigurer::in_memory();
    let (listener, _) = listener_with(&configurer, &[]);
    listener.on_start().await.unwrap();

    let execution = only_execution(&configurer.explorer()).await;
    assert!(execution.parameters.is_empty());
    assert_eq!(execution.exit_code, None);
    assert_eq!(execution.exit_message, None);
    assert_eq!(execution.end_time, None);
    assert_eq!(execution.task_name, TASK_NAME);
}

#[tokio::test]
async fn test_task_create_with_args() {
    let configurer = TaskConfigurer::in_memory();
    let (listener, _) = listener_with(&configurer, &["--foo=bar", "--baz=qux"]);
    listener.on_start().await.unwrap();

    let execution = only_execution(&configurer.explorer()).await;
    assert_eq!(execution.parameters, vec!["--foo=bar", "--baz=qux"]);
}

#[tokio::test]
async fn test_task_update() {
    let configurer = TaskConfigurer::in_memory();
    let (listener, _) = listener_with(&configurer, &[]);
    listener.on_start().await.unwrap();
    listener.on_complete().await.unwrap();

    let execution = only_execution(&configurer.explorer()).await;
    assert_eq!(execution.exit_code, Some(0));
    assert_eq!(execution.exit_message, None);
    assert!(execution.end_time.unwrap() >= execution.start_time);
}

#[tokio::test]
async fn test_task_failed_update() {
    let configurer = TaskConfigurer::in_memory();
    let (listener, _) = listener_with(&configurer, &[]);
    listener.on_start().await.unwrap();

    let error = anyhow::anyhow!("This was expected");
    listener.on_failure(&error);
    listener.on_complete().await.unwrap();

    let execution = only_execution(&configurer.explorer()).await;
    assert_eq!(execution.exit_code, Some(1));
    assert!(execution
        .exit_message
        .as_deref()
        .unwrap()
        .contains("This was expected"));
    assert!(execution.end_time.is_some());
}

#[tokio::test]
async fn test_events_follow_lifecycle() {
    let configurer = TaskConfigurer::in_memory();
    let (listener, publisher) = listener_with(&configurer, &[]);
    let mut events = publisher.subscribe();

    let started = listener.on_start().await.unwrap();
    listener.on_failure(&anyhow::anyhow!("boom"));
    listener.on_complete().await.unwrap();

    let first = events.recv().await.unwrap();
    assert_eq!(first.kind, TaskEventKind::Started);
    assert_eq!(first.execution, started);

    let second = events.recv().await.unwrap();
    assert_eq!(second.kind, TaskEventKind::Failed);
    assert_eq!(second.execution.exit_code, Some(1));
    assert_ne!(first.event_id, second.event_id);
}
