//! Data access for the forwarding bot.
//!
//! Three key families live under the `fwdbot` namespace:
//!
//! - `fwdbot:{bot}:owner` holds the owner's user id.
//! - `fwdbot:{bot}:chats` is the index of source chats with destinations.
//! - `fwdbot:{bot}:{chat}` is the set of destinations of one source chat.
//!
//! Multi-key updates are not transactional. A concurrent reader may observe
//! the index and a mapping set out of step with each other.

use super::storage::{KeyValueStorage, RedisStore};
use crate::config::Config;
use crate::util;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub type BotId = i64;
pub type UserId = i64;
pub type ChatId = i64;

#[derive(thiserror::Error, Debug)]
pub enum DatabaseError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Store(#[from] E),
    #[error("value {value:?} under {key} is not a numeric id")]
    MalformedId { key: String, value: String },
}

/// Destinations of every indexed source chat of a bot, keyed by the chat id
/// as it is stored in the index.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChatMap(BTreeMap<String, Vec<ChatId>>);

impl ChatMap {
    pub fn get(&self, chat_id: ChatId) -> Option<&[ChatId]> {
        self.0.get(&chat_id.to_string()).map(Vec::as_slice)
    }

    pub fn chats(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone)]
pub struct Database<S: KeyValueStorage> {
    store: S,
}

impl Database<RedisStore> {
    /// Opens the store named by `config`. No other operation is reachable
    /// before this succeeds.
    pub async fn connect(config: &Config) -> Result<Self, redis::RedisError> {
        let store = RedisStore::connect(&config.redis_uri).await?;
        Ok(Database::new(store))
    }
}

impl<S: KeyValueStorage> Database<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases this handle. Clones made from it keep sharing the
    /// connection, which closes once the last of them is dropped.
    pub fn close(self) {
        drop(self.store);
        info!("Released redis handle");
    }

    pub async fn get_owner(
        &self,
        bot_id: BotId,
    ) -> Result<Option<UserId>, DatabaseError<S::Error>> {
        let key = util::owner_key(bot_id);
        match self.store.get(&key).await? {
            Some(raw) => match util::decode_id(&raw) {
                Some(id) => Ok(Some(id)),
                None => Err(DatabaseError::MalformedId {
                    key,
                    value: String::from_utf8_lossy(&raw).into_owned(),
                }),
            },
            None => Ok(None),
        }
    }

    pub async fn set_owner(
        &self,
        bot_id: BotId,
        user_id: UserId,
    ) -> Result<(), DatabaseError<S::Error>> {
        self.store
            .set(&util::owner_key(bot_id), util::encode_id(user_id))
            .await?;
        Ok(())
    }

    /// Adds `to_chat_id` as a destination of `chat_id`, registering `chat_id`
    /// in the index when it had no destinations yet. Returns whether the
    /// destination is new.
    pub async fn set_chat_map(
        &self,
        bot_id: BotId,
        chat_id: ChatId,
        to_chat_id: ChatId,
    ) -> Result<bool, DatabaseError<S::Error>> {
        let key = util::chat_key(bot_id, chat_id);
        if self.store.scard(&key).await? == 0 {
            debug!("Creating new set for {}:{}", bot_id, chat_id);
            self.store
                .sadd(&util::index_key(bot_id), util::encode_id(chat_id))
                .await?;
        }
        Ok(self.store.sadd(&key, util::encode_id(to_chat_id)).await?)
    }

    /// Destinations of `chat_id`, or `None` when it has none. Unlike
    /// `get_all_chat_map`, which lists an indexed chat without destinations
    /// as `[]`, an empty set is reported as absent.
    pub async fn get_chat_map(
        &self,
        bot_id: BotId,
        chat_id: ChatId,
    ) -> Result<Option<Vec<ChatId>>, DatabaseError<S::Error>> {
        let key = util::chat_key(bot_id, chat_id);
        let ids = self.decode_members(&key).await?;
        if ids.is_empty() {
            return Ok(None);
        }
        Ok(Some(ids))
    }

    /// Removes one destination, or with `None` unregisters the chat and drops
    /// all of its destinations. Returns whether anything was removed.
    pub async fn rem_chat_map(
        &self,
        bot_id: BotId,
        chat_id: ChatId,
        to_chat_id: Option<ChatId>,
    ) -> Result<bool, DatabaseError<S::Error>> {
        let key = util::chat_key(bot_id, chat_id);
        match to_chat_id {
            Some(to_chat_id) => Ok(self
                .store
                .srem(&key, util::encode_id(to_chat_id))
                .await?),
            None => {
                self.store
                    .srem(&util::index_key(bot_id), util::encode_id(chat_id))
                    .await?;
                Ok(self.store.del(&key).await?)
            }
        }
    }

    /// Reads the index, then each chat's destinations one after another.
    pub async fn get_all_chat_map(
        &self,
        bot_id: BotId,
    ) -> Result<ChatMap, DatabaseError<S::Error>> {
        let index_key = util::index_key(bot_id);
        let mut map = BTreeMap::new();
        for chat in self.store.smembers(&index_key).await? {
            let chat = String::from_utf8_lossy(&chat).into_owned();
            let chat_id =
                util::decode_id(chat.as_bytes()).ok_or_else(|| DatabaseError::MalformedId {
                    key: index_key.clone(),
                    value: chat.clone(),
                })?;
            let ids = self.get_chat_map(bot_id, chat_id).await?;
            map.insert(chat, ids.unwrap_or_default());
        }
        Ok(ChatMap(map))
    }

    async fn decode_members(&self, key: &str) -> Result<Vec<ChatId>, DatabaseError<S::Error>> {
        let mut ids = Vec::new();
        for raw in self.store.smembers(key).await? {
            let id = util::decode_id(&raw).ok_or_else(|| DatabaseError::MalformedId {
                key: key.to_string(),
                value: String::from_utf8_lossy(&raw).into_owned(),
            })?;
            ids.push(id);
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use bytes::Bytes;

    fn database() -> Database<MemoryStore> {
        Database::new(MemoryStore::new())
    }

    async fn index(db: &Database<MemoryStore>, bot_id: BotId) -> Vec<String> {
        let mut chats: Vec<String> = db
            .store()
            .smembers(&util::index_key(bot_id))
            .await
            .unwrap()
            .iter()
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .collect();
        chats.sort();
        chats
    }

    #[tokio::test]
    async fn it_gets_none_for_unset_owner() {
        let db = database();

        assert_eq!(db.get_owner(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn it_sets_and_gets_owner() {
        let db = database();

        db.set_owner(1, 1001).await.unwrap();
        assert_eq!(db.get_owner(1).await.unwrap(), Some(1001));

        db.set_owner(1, 1002).await.unwrap();
        assert_eq!(db.get_owner(1).await.unwrap(), Some(1002));
        assert_eq!(db.get_owner(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn it_stores_owner_under_namespaced_key() {
        let db = database();

        db.set_owner(7, 99).await.unwrap();
        assert_eq!(
            db.store().get("fwdbot:7:owner").await.unwrap(),
            Some(Bytes::from("99"))
        );
    }

    #[tokio::test]
    async fn it_reports_malformed_owner() {
        let db = database();

        db.store()
            .set("fwdbot:1:owner", Bytes::from("nobody"))
            .await
            .unwrap();
        match db.get_owner(1).await {
            Err(DatabaseError::MalformedId { key, value }) => {
                assert_eq!(key, "fwdbot:1:owner");
                assert_eq!(value, "nobody");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_propagates_store_errors() {
        let db = database();

        db.store()
            .set("fwdbot:1:-5", Bytes::from("not a set"))
            .await
            .unwrap();
        assert!(matches!(
            db.set_chat_map(1, -5, 10).await,
            Err(DatabaseError::Store(_))
        ));
    }

    #[tokio::test]
    async fn it_adds_chat_map() {
        let db = database();

        assert!(db.set_chat_map(1, -100, 200).await.unwrap());
        assert!(!db.set_chat_map(1, -100, 200).await.unwrap());
        assert_eq!(db.get_chat_map(1, -100).await.unwrap(), Some(vec![200]));
        assert_eq!(index(&db, 1).await, vec!["-100"]);
    }

    #[tokio::test]
    async fn it_indexes_chat_once() {
        let db = database();

        db.set_chat_map(1, -100, 200).await.unwrap();
        db.set_chat_map(1, -100, 300).await.unwrap();
        db.set_chat_map(1, -100, 400).await.unwrap();

        assert_eq!(index(&db, 1).await, vec!["-100"]);
        assert_eq!(
            db.get_chat_map(1, -100).await.unwrap(),
            Some(vec![200, 300, 400])
        );
    }

    #[tokio::test]
    async fn it_gets_none_for_unmapped_chat() {
        let db = database();

        assert_eq!(db.get_chat_map(1, 5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn it_keeps_bots_apart() {
        let db = database();

        db.set_chat_map(1, 5, 6).await.unwrap();
        db.set_chat_map(2, 5, 7).await.unwrap();

        assert_eq!(db.get_chat_map(1, 5).await.unwrap(), Some(vec![6]));
        assert_eq!(db.get_chat_map(2, 5).await.unwrap(), Some(vec![7]));
    }

    #[tokio::test]
    async fn it_removes_single_destination() {
        let db = database();

        db.set_chat_map(1, 5, 6).await.unwrap();
        db.set_chat_map(1, 5, 7).await.unwrap();

        assert!(db.rem_chat_map(1, 5, Some(6)).await.unwrap());
        assert!(!db.rem_chat_map(1, 5, Some(6)).await.unwrap());
        assert_eq!(db.get_chat_map(1, 5).await.unwrap(), Some(vec![7]));
        assert_eq!(index(&db, 1).await, vec!["5"]);
    }

    #[tokio::test]
    async fn it_removes_zero_destination() {
        let db = database();

        db.set_chat_map(1, 5, 0).await.unwrap();
        db.set_chat_map(1, 5, 7).await.unwrap();

        assert!(db.rem_chat_map(1, 5, Some(0)).await.unwrap());
        assert_eq!(db.get_chat_map(1, 5).await.unwrap(), Some(vec![7]));
    }

    #[tokio::test]
    async fn it_clears_chat_map() {
        let db = database();

        db.set_chat_map(1, 5, 6).await.unwrap();
        db.set_chat_map(1, 5, 7).await.unwrap();
        db.set_chat_map(1, 8, 9).await.unwrap();

        assert!(db.rem_chat_map(1, 5, None).await.unwrap());
        assert_eq!(db.get_chat_map(1, 5).await.unwrap(), None);
        assert!(!db.store().contains_key("fwdbot:1:5").await);
        assert_eq!(index(&db, 1).await, vec!["8"]);

        assert!(!db.rem_chat_map(1, 5, None).await.unwrap());
    }

    #[tokio::test]
    async fn it_reindexes_after_clear() {
        let db = database();

        db.set_chat_map(1, 5, 6).await.unwrap();
        db.rem_chat_map(1, 5, None).await.unwrap();
        db.set_chat_map(1, 5, 7).await.unwrap();

        assert_eq!(index(&db, 1).await, vec!["5"]);
        assert_eq!(db.get_chat_map(1, 5).await.unwrap(), Some(vec![7]));
    }

    #[tokio::test]
    async fn it_gets_all_chat_map() {
        let db = database();

        db.set_chat_map(1, -100, 200).await.unwrap();
        db.set_chat_map(1, -100, 300).await.unwrap();
        db.set_chat_map(1, 42, -100).await.unwrap();
        db.set_chat_map(2, 77, 78).await.unwrap();

        let map = db.get_all_chat_map(1).await.unwrap();
        let chats: Vec<&str> = map.chats().collect();
        assert_eq!(chats, index(&db, 1).await);
        assert_eq!(map.get(-100), Some(&[200, 300][..]));
        assert_eq!(map.get(42), Some(&[-100][..]));
        assert_eq!(map.get(77), None);
    }

    #[tokio::test]
    async fn it_keeps_drained_chat_in_index() {
        let db = database();

        db.set_chat_map(1, 5, 6).await.unwrap();
        db.rem_chat_map(1, 5, Some(6)).await.unwrap();

        let map = db.get_all_chat_map(1).await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(5), Some(&[][..]));
        assert_eq!(db.get_chat_map(1, 5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn it_keeps_clones_usable_after_close() {
        let db = database();
        let other = db.clone();

        db.set_owner(1, 10).await.unwrap();
        db.close();
        assert_eq!(other.get_owner(1).await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn it_gets_empty_map_for_unknown_bot() {
        let db = database();

        assert!(db.get_all_chat_map(404).await.unwrap().is_empty());
    }

    #[test]
    fn it_serializes_chat_map_as_object() {
        let mut inner = BTreeMap::new();
        inner.insert("-100".to_string(), vec![1, 2]);
        let json = serde_json::to_string(&ChatMap(inner)).unwrap();

        assert_eq!(json, r#"{"-100":[1,2]}"#);
    }
}
