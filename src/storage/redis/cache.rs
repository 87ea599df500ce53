//! Key-value operations

use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;

impl RedisPool {
    /// Get a value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    /// Set a key-value pair with optional TTL in seconds
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        let mut conn = self.connection();
        match ttl {
            Some(seconds) => {
                let _: () = conn.set_ex(key, value, seconds).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    /// Delete a key; returns whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
