use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use super::TaskLifecycleEvent;
use crate::constants::DEFAULT_EVENT_CHANNEL_CAPACITY;

/// Sink for lifecycle events.
///
/// Publishing is fire-and-forget: callers log a failed publish and carry on,
/// the execution record is the source of truth.
#[async_trait]
pub trait TaskEventPublisher: Send + Sync + Debug {
    async fn publish(&self, event: TaskLifecycleEvent) -> Result<(), PublishError>;
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed: {event_name} dropped")]
    ChannelClosed { event_name: &'static str },
}

/// Fan-out publisher over a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<TaskLifecycleEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskLifecycleEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl TaskEventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: TaskLifecycleEvent) -> Result<(), PublishError> {
        // send() only fails when nobody is subscribed
        if self.sender.send(event).is_err() {
            tracing::trace!("No lifecycle event subscribers");
        }
        Ok(())
    }
}

/// Hands events to a single consumer over a bounded tokio mpsc channel.
///
/// Publishing waits for room in the channel and fails once the receiver
/// has been dropped.
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::Sender<TaskLifecycleEvent>,
}

impl ChannelEventPublisher {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TaskLifecycleEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl TaskEventPublisher for ChannelEventPublisher {
    async fn publish(&self, event: TaskLifecycleEvent) -> Result<(), PublishError> {
        let event_name = event.name();
        self.sender
            .send(event)
            .await
            .map_err(|_| PublishError::ChannelClosed { event_name })
    }
}

/// Keeps every published event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<Mutex<Vec<TaskLifecycleEvent>>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TaskLifecycleEvent> {
        self.events.lock().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(TaskLifecycleEvent::name).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl TaskEventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: TaskLifecycleEvent) -> Result<(), PublishError> {
        self.events.lock().push(event);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventPublisher;

#[async_trait]
impl TaskEventPublisher for NoopEventPublisher {
    async fn publish(&self, _event: TaskLifecycleEvent) -> Result<(), PublishError> {
        Ok(())
    }
}
