//! Redis connection management

use crate::config::RedisConfig;
use crate::utils::error::{AuthzError, Result};
use redis::{Client, aio::MultiplexedConnection};
use std::time::Duration;
use tracing::{debug, info};

/// Shared Redis handle
///
/// Commands go over one multiplexed connection; pub/sub subscriptions open
/// their own dedicated connection from the same client.
#[derive(Clone)]
pub struct RedisPool {
    pub(crate) client: Client,
    pub(crate) connection: MultiplexedConnection,
    pub(crate) config: RedisConfig,
}

impl RedisPool {
    /// Connect to Redis, bounded by the configured connection timeout
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Connecting to Redis");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str())?;
        let timeout = Duration::from_secs(config.connection_timeout);

        let connection = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| {
                AuthzError::timeout(format!("Redis connection timed out after {:?}", timeout))
            })??;

        info!("Redis connection established");
        Ok(Self {
            client,
            connection,
            config: config.clone(),
        })
    }

    /// A command connection; clones share the underlying socket
    pub(crate) fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");
        let mut conn = self.connection();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "invalid_url".to_string(),
        }
    }
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &Self::sanitize_url(&self.config.url))
            .finish()
    }
}
