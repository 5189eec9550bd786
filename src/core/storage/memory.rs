use super::KeyValueStorage;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("WRONGTYPE Operation against key {0} holding the wrong kind of value")]
    WrongType(String),
}

#[derive(Debug)]
enum Entry {
    Scalar(Bytes),
    Set(HashSet<Bytes>),
}

/// In-process store with the Redis semantics this crate relies on.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

fn wrong_type(key: &str) -> MemoryStoreError {
    MemoryStoreError::WrongType(key.to_string())
}

#[async_trait]
impl KeyValueStorage for MemoryStore {
    type Error = MemoryStoreError;

    async fn get(&self, key: &str) -> Result<Option<Bytes>, Self::Error> {
        match self.entries.lock().await.get(key) {
            Some(Entry::Scalar(value)) => Ok(Some(value.clone())),
            Some(Entry::Set(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), Self::Error> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), Entry::Scalar(value));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, Self::Error> {
        Ok(self.entries.lock().await.remove(key).is_some())
    }

    async fn sadd(&self, key: &str, member: Bytes) -> Result<bool, Self::Error> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(HashSet::new()));
        match entry {
            Entry::Set(members) => Ok(members.insert(member)),
            Entry::Scalar(_) => Err(wrong_type(key)),
        }
    }

    async fn srem(&self, key: &str, member: Bytes) -> Result<bool, Self::Error> {
        let mut entries = self.entries.lock().await;
        let (removed, now_empty) = match entries.get_mut(key) {
            Some(Entry::Set(members)) => (members.remove(&member), members.is_empty()),
            Some(Entry::Scalar(_)) => return Err(wrong_type(key)),
            None => return Ok(false),
        };
        // redis drops a set together with its last member
        if now_empty {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<Bytes>, Self::Error> {
        match self.entries.lock().await.get(key) {
            Some(Entry::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(Entry::Scalar(_)) => Err(wrong_type(key)),
            None => Ok(Vec::new()),
        }
    }

    async fn scard(&self, key: &str) -> Result<u64, Self::Error> {
        match self.entries.lock().await.get(key) {
            Some(Entry::Set(members)) => Ok(members.len() as u64),
            Some(Entry::Scalar(_)) => Err(wrong_type(key)),
            None => Ok(0),
        }
    }
}
