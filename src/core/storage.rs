mod memory;
mod redis;

use async_trait::async_trait;
use bytes::Bytes;

pub use self::memory::{MemoryStore, MemoryStoreError};
pub use self::redis::RedisStore;

/// The scalar and set primitives of a remote key-value store.
///
/// Implementations own their connection handling: a failed command is
/// returned as-is and reconnection, if any, happens inside the client.
#[async_trait]
pub trait KeyValueStorage: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn get(&self, key: &str) -> Result<Option<Bytes>, Self::Error>;

    async fn set(&self, key: &str, value: Bytes) -> Result<(), Self::Error>;

    /// Returns whether the key existed.
    async fn del(&self, key: &str) -> Result<bool, Self::Error>;

    /// Returns whether the member was newly added.
    async fn sadd(&self, key: &str, member: Bytes) -> Result<bool, Self::Error>;

    /// Returns whether the member was present.
    async fn srem(&self, key: &str, member: Bytes) -> Result<bool, Self::Error>;

    async fn smembers(&self, key: &str) -> Result<Vec<Bytes>, Self::Error>;

    async fn scard(&self, key: &str) -> Result<u64, Self::Error>;
}
