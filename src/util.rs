use bytes::Bytes;

/// Namespace shared by every key this crate touches.
pub const KEY_PREFIX: &str = "fwdbot";

pub fn owner_key(bot_id: i64) -> String {
    format!("{}:{}:owner", KEY_PREFIX, bot_id)
}

/// Set of source chats of a bot that have at least one destination.
pub fn index_key(bot_id: i64) -> String {
    format!("{}:{}:chats", KEY_PREFIX, bot_id)
}

/// Set of destinations registered for one source chat.
pub fn chat_key(bot_id: i64, chat_id: i64) -> String {
    format!("{}:{}:{}", KEY_PREFIX, bot_id, chat_id)
}

/// Ids are stored as decimal text so they stay readable from `redis-cli`.
pub fn encode_id(id: i64) -> Bytes {
    Bytes::from(id.to_string())
}

pub fn decode_id(raw: &[u8]) -> Option<i64> {
    std::str::from_utf8(raw).ok()?.trim().parse().ok()
}
