use std::sync::Arc;
use teloxide::dispatching::DpHandlerDescription;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, MessageId};

use crate::handlers::affirmation::{send_daily_affirmation, user_key, HandlerResult};
use crate::handlers::messages::{text, MessageKey};
use crate::keyboard::{create_category_keyboard, parse_category_callback, SHOW_AFFIRMATION_CALLBACK};
use crate::localization::Localizer;
use crate::state::BotState;

/// What a button tap asks for, decoded from its callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction<'a> {
    ShowAffirmation,
    ToggleCategory(&'a str),
    Unknown,
}

impl<'a> CallbackAction<'a> {
    pub fn parse(data: &'a str) -> Self {
        if data == SHOW_AFFIRMATION_CALLBACK {
            Self::ShowAffirmation
        } else if let Some(category_id) = parse_category_callback(data) {
            Self::ToggleCategory(category_id)
        } else {
            Self::Unknown
        }
    }
}

pub fn callback_handler(
    state: Arc<BotState>,
) -> dptree::Handler<'static, DependencyMap, HandlerResult, DpHandlerDescription> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let state = state.clone();
        async move { handle_callback_query(bot, q, state).await }
    })
}

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    state: Arc<BotState>,
) -> HandlerResult {
    // Answered first so the client's loading indicator stops whatever happens next.
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        log::warn!("Failed to answer callback query {}: {}", query.id, e);
    }

    let (Some(message), Some(data)) = (query.message, query.data) else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let localizer = state
        .localizer_for(chat_id.0, query.from.language_code.as_deref())
        .await;

    let action = CallbackAction::parse(&data);
    if let Err(e) = run_action(&bot, chat_id, message.id, action, &state, &localizer).await {
        log::error!("Failed to handle callback {:?} from chat {}: {}", data, chat_id.0, e);
    }
    Ok(())
}

async fn run_action(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    action: CallbackAction<'_>,
    state: &Arc<BotState>,
    localizer: &Localizer,
) -> HandlerResult {
    match action {
        CallbackAction::ShowAffirmation => send_daily_affirmation(bot, chat_id, state, localizer).await,
        CallbackAction::ToggleCategory(category_id) => {
            let toggled = async {
                let prefs = state.engine.toggle_category(&user_key(chat_id), category_id).await?;
                let categories = state.engine.categories().await?;
                Ok::<_, crate::error::StoreError>((categories, prefs))
            }
            .await;

            match toggled {
                Ok((categories, prefs)) => {
                    bot.edit_message_reply_markup(chat_id, message_id)
                        .reply_markup(create_category_keyboard(
                            &categories,
                            &prefs.selected_categories,
                            localizer,
                            &text(MessageKey::ShowAffirmation, localizer),
                        ))
                        .await?;
                }
                Err(e) => {
                    log::error!("Failed to toggle category {} for chat {}: {}", category_id, chat_id.0, e);
                    bot.send_message(chat_id, text(MessageKey::TryAgain, localizer)).await?;
                }
            }
            Ok(())
        }
        CallbackAction::Unknown => {
            log::warn!("Ignoring unknown callback action from chat {}", chat_id.0);
            Ok(())
        }
    }
}
