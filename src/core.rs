pub mod database;
pub mod storage;

pub use self::database::{BotId, ChatId, ChatMap, Database, DatabaseError, UserId};
pub use self::storage::{KeyValueStorage, MemoryStore, MemoryStoreError, RedisStore};
