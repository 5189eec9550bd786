mod runner;

use crate::core::{BotId, ChatId, UserId};
use clap::Subcommand;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the owner of a bot
    GetOwner { bot_id: BotId },
    /// Assign the owner of a bot
    SetOwner { bot_id: BotId, user_id: UserId },
    /// Forward messages from one chat to another
    Map {
        bot_id: BotId,
        #[arg(allow_negative_numbers = true)]
        chat_id: ChatId,
        #[arg(allow_negative_numbers = true)]
        to_chat_id: ChatId,
    },
    /// Stop forwarding to one destination, or to all of them
    Unmap {
        bot_id: BotId,
        #[arg(allow_negative_numbers = true)]
        chat_id: ChatId,
        #[arg(allow_negative_numbers = true)]
        to_chat_id: Option<ChatId>,
    },
    /// Print the destinations of a chat
    Targets {
        bot_id: BotId,
        #[arg(allow_negative_numbers = true)]
        chat_id: ChatId,
    },
    /// Print every forwarding of a bot
    Maps { bot_id: BotId },
}

pub use self::runner::CommandRunner;
