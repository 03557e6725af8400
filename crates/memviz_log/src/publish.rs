//! Delivery of drained events.
//!
//! The orchestrating layer drains a replay's pending events after every
//! operation and hands them to an [`EventPublisher`]. Publishing never fails
//! the operation that raised the events.

use crate::event::ReplayEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default broadcast channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Sink for drained replay events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish events in the order given
    async fn publish(&self, events: &[ReplayEvent]);
}

/// Fans events out to any number of subscribers
///
/// Subscribers that fall behind by more than the channel capacity miss the
/// oldest events. Publishing with no subscribers is a no-op.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<ReplayEvent>,
}

impl BroadcastPublisher {
    /// Create with the given channel capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReplayEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, events: &[ReplayEvent]) {
        for event in events {
            // Err only means nobody is listening
            let _ = self.sender.send(event.clone());
        }
    }
}

/// Writes each event to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, events: &[ReplayEvent]) {
        for event in events {
            let payload = serde_json::to_string(&event.kind).unwrap_or_default();
            if event.is_error() {
                tracing::warn!(
                    replay_id = %event.replay_id,
                    event_id = %event.event_id,
                    event = event.name(),
                    %payload,
                    "replay event"
                );
            } else {
                tracing::info!(
                    replay_id = %event.replay_id,
                    event_id = %event.event_id,
                    event = event.name(),
                    %payload,
                    "replay event"
                );
            }
        }
    }
}

/// Publishes to several publishers in turn
#[derive(Clone, Default)]
pub struct CompositePublisher {
    publishers: Vec<Arc<dyn EventPublisher>>,
}

impl CompositePublisher {
    /// Create with no publishers
    #[must_use]
    pub fn new() -> Self {
        Self {
            publishers: Vec::new(),
        }
    }

    /// Add a publisher
    #[must_use]
    pub fn with(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }

    /// Number of publishers
    #[must_use]
    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    /// Whether there are no publishers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

impl std::fmt::Debug for CompositePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositePublisher")
            .field("publishers", &self.publishers.len())
            .finish()
    }
}

#[async_trait]
impl EventPublisher for CompositePublisher {
    async fn publish(&self, events: &[ReplayEvent]) {
        for publisher in &self.publishers {
            publisher.publish(events).await;
        }
    }
}
