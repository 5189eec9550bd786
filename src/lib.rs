//! Persistence for a chat-forwarding bot: bot owners and the per-bot map of
//! which chats forward into which, kept in Redis.
//!
//! ```no_run
//! use fwdbot_store::{Config, Database};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let db = Database::connect(&Config::from_env()).await?;
//! db.set_chat_map(1, -1001, -1002).await?;
//! let targets = db.get_chat_map(1, -1001).await?;
//! db.close();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
mod util;

pub use crate::config::Config;
pub use crate::core::{
    BotId, ChatId, ChatMap, Database, DatabaseError, KeyValueStorage, MemoryStore, RedisStore,
    UserId,
};
pub use crate::util::KEY_PREFIX;
