use super::Commands;
use crate::core::{BotId, ChatId, Database, KeyValueStorage, UserId};
use anyhow::Result;
use std::io::Write;

pub struct CommandRunner<S: KeyValueStorage> {
    database: Database<S>,
}

impl<S: KeyValueStorage> CommandRunner<S> {
    pub fn new(database: Database<S>) -> Self {
        Self { database }
    }

    pub fn into_database(self) -> Database<S> {
        self.database
    }

    pub async fn run(&self, command: &Option<Commands>, out: &mut impl Write) -> Result<()> {
        match command {
            Some(Commands::GetOwner { bot_id }) => {
                get_owner(&self.database, *bot_id, out).await?;
            }
            Some(Commands::SetOwner { bot_id, user_id }) => {
                set_owner(&self.database, *bot_id, *user_id).await?;
            }
            Some(Commands::Map {
                bot_id,
                chat_id,
                to_chat_id,
            }) => {
                self.database
                    .set_chat_map(*bot_id, *chat_id, *to_chat_id)
                    .await?;
            }
            Some(Commands::Unmap {
                bot_id,
                chat_id,
                to_chat_id,
            }) => {
                self.database
                    .rem_chat_map(*bot_id, *chat_id, *to_chat_id)
                    .await?;
            }
            Some(Commands::Targets { bot_id, chat_id }) => {
                targets(&self.database, *bot_id, *chat_id, out).await?;
            }
            Some(Commands::Maps { bot_id }) => {
                maps(&self.database, *bot_id, out).await?;
            }
            None => {}
        }

        Ok(())
    }
}

async fn get_owner<S: KeyValueStorage>(
    database: &Database<S>,
    bot_id: BotId,
    out: &mut impl Write,
) -> Result<()> {
    if let Some(owner) = database.get_owner(bot_id).await? {
        writeln!(out, "{}", owner)?;
    }
    Ok(())
}

async fn set_owner<S: KeyValueStorage>(
    database: &Database<S>,
    bot_id: BotId,
    user_id: UserId,
) -> Result<()> {
    database.set_owner(bot_id, user_id).await?;
    Ok(())
}

async fn targets<S: KeyValueStorage>(
    database: &Database<S>,
    bot_id: BotId,
    chat_id: ChatId,
    out: &mut impl Write,
) -> Result<()> {
    let ids = database
        .get_chat_map(bot_id, chat_id)
        .await?
        .unwrap_or_default();
    serde_json::to_writer(&mut *out, &ids)?;
    writeln!(out)?;
    Ok(())
}

async fn maps<S: KeyValueStorage>(
    database: &Database<S>,
    bot_id: BotId,
    out: &mut impl Write,
) -> Result<()> {
    let map = database.get_all_chat_map(bot_id).await?;
    serde_json::to_writer(&mut *out, &map)?;
    writeln!(out)?;
    Ok(())
}
