use super::KeyValueStorage;
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ErrorKind, RedisError};
use std::time::Duration;
use tracing::{error, info};

/// Redis backend. Clones share one multiplexed connection that the
/// `ConnectionManager` re-establishes after a drop.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

impl RedisStore {
    /// Fails within `CONNECT_TIMEOUT` when the server cannot be reached.
    pub async fn connect(uri: &str) -> Result<RedisStore, RedisError> {
        let result = tokio::time::timeout(CONNECT_TIMEOUT, RedisStore::open(uri))
            .await
            .unwrap_or_else(|_| {
                Err(RedisError::from((
                    ErrorKind::IoError,
                    "timed out connecting to redis",
                )))
            });
        match result {
            Ok(store) => {
                info!("Connected to redis");
                Ok(store)
            }
            Err(e) => {
                error!("Redis error: {}", e);
                Err(e)
            }
        }
    }

    async fn open(uri: &str) -> Result<RedisStore, RedisError> {
        let client = redis::Client::open(uri)?;
        // refused connections surface here, not in the manager's retry loop
        let _ = client.get_multiplexed_async_connection().await?;
        let manager = ConnectionManager::new(client).await?;
        Ok(RedisStore { manager })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

#[async_trait]
impl KeyValueStorage for RedisStore {
    type Error = RedisError;

    async fn get(&self, key: &str) -> Result<Option<Bytes>, Self::Error> {
        let value: Option<Vec<u8>> = self.conn().get(key).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), Self::Error> {
        self.conn().set::<_, _, ()>(key, &value[..]).await
    }

    async fn del(&self, key: &str) -> Result<bool, Self::Error> {
        let removed: u64 = self.conn().del(key).await?;
        Ok(removed > 0)
    }

    async fn sadd(&self, key: &str, member: Bytes) -> Result<bool, Self::Error> {
        let added: u64 = self.conn().sadd(key, &member[..]).await?;
        Ok(added > 0)
    }

    async fn srem(&self, key: &str, member: Bytes) -> Result<bool, Self::Error> {
        let removed: u64 = self.conn().srem(key, &member[..]).await?;
        Ok(removed > 0)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<Bytes>, Self::Error> {
        let members: Vec<Vec<u8>> = self.conn().smembers(key).await?;
        Ok(members.into_iter().map(Bytes::from).collect())
    }

    async fn scard(&self, key: &str) -> Result<u64, Self::Error> {
        self.conn().scard(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn it_fails_fast_when_unreachable() {
        let started = Instant::now();

        assert!(RedisStore::connect("redis://127.0.0.1:1").await.is_err());
        assert!(started.elapsed() < CONNECT_TIMEOUT + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn it_rejects_malformed_uri() {
        assert!(RedisStore::connect("not a uri").await.is_err());
    }
}
