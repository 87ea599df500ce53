//! Invalidation protocol
//!
//! The identity authority publishes an [`InvalidationEvent`] after every
//! mutation. Each process subscribes once and drops its local copy of the
//! named profile. Delivery is best effort; the profile TTL bounds staleness
//! when an event is missed.

use super::types::ProfileKey;
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

/// Payload published on the invalidation channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationEvent {
    pub subject_id: String,
    pub service: String,
}

impl InvalidationEvent {
    pub fn new(subject_id: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            service: service.into(),
        }
    }

    pub fn key(&self) -> ProfileKey {
        ProfileKey::new(&self.subject_id, &self.service)
    }
}

/// Stream of invalidation events delivered to one subscriber
pub type InvalidationStream = BoxStream<'static, InvalidationEvent>;

/// Fan-out channel for invalidation events
#[async_trait]
pub trait InvalidationBus: Send + Sync {
    async fn publish(&self, event: &InvalidationEvent) -> Result<()>;

    /// Subscribe; the subscription is active once this returns
    async fn subscribe(&self) -> Result<InvalidationStream>;
}

/// Single-process bus over a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct LocalInvalidationBus {
    sender: broadcast::Sender<InvalidationEvent>,
}

impl LocalInvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LocalInvalidationBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl InvalidationBus for LocalInvalidationBus {
    async fn publish(&self, event: &InvalidationEvent) -> Result<()> {
        // No subscribers is not an error: nobody holds a copy to drop.
        let _ = self.sender.send(event.clone());
        Ok(())
    }

    async fn subscribe(&self) -> Result<InvalidationStream> {
        let mut receiver = self.sender.subscribe();
        let stream = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Invalidation subscriber lagged, {} events dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
