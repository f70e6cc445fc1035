use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::commands::Command;
use crate::handlers::affirmation::{
    handle_categories, handle_language, handle_preferences, send_daily_affirmation, HandlerResult,
};
use crate::handlers::messages::{text, MessageKey};
use crate::state::BotState;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let client_language = msg.from().and_then(|user| user.language_code.clone());
    let localizer = state.localizer_for(chat_id.0, client_language.as_deref()).await;

    match cmd {
        Command::Start => {
            bot.send_message(chat_id, text(MessageKey::Welcome, &localizer))
                .await?;
        }
        Command::Affirmation => {
            send_daily_affirmation(&bot, chat_id, &state, &localizer).await?;
        }
        Command::Categories => {
            handle_categories(&bot, chat_id, &state, &localizer).await?;
        }
        Command::Language(code) => {
            handle_language(&bot, chat_id, &code, &state).await?;
        }
        Command::Preferences => {
            handle_preferences(&bot, chat_id, &state, &localizer).await?;
        }
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
    }
    Ok(())
}
