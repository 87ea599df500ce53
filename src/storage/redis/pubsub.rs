//! Redis Pub/Sub operations

use super::pool::RedisPool;
use crate::utils::error::Result;
use futures::Stream;
use redis::AsyncCommands;
use tracing::debug;

/// An active subscription on a dedicated connection
pub struct Subscription {
    pubsub: redis::aio::PubSub,
    channels: Vec<String>,
}

impl RedisPool {
    /// Publish message to channel; returns the number of receivers
    pub async fn publish(&self, channel: &str, message: &str) -> Result<u64> {
        let mut conn = self.connection();
        let receivers: u64 = conn.publish(channel, message).await?;
        Ok(receivers)
    }

    /// Subscribe to channels
    pub async fn subscribe(&self, channels: &[String]) -> Result<Subscription> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        for channel in channels {
            pubsub.subscribe(channel).await?;
            debug!("Subscribed to Redis channel {}", channel);
        }
        Ok(Subscription {
            pubsub,
            channels: channels.to_vec(),
        })
    }
}

impl Subscription {
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Consume the subscription as a message stream
    pub fn into_stream(self) -> impl Stream<Item = redis::Msg> + Send + 'static {
        self.pubsub.into_on_message()
    }
}
