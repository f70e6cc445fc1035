use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::engine::DailyAffirmation;
use crate::error::StoreError;
use crate::handlers::messages::{text, MessageKey};
use crate::keyboard::create_category_keyboard;
use crate::localization::Localizer;
use crate::state::BotState;
use crate::types::{AffirmationCategory, UserAffirmationPreferences};

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Preferences are keyed by chat, one record per Telegram chat.
pub fn user_key(chat_id: ChatId) -> String {
    chat_id.0.to_string()
}

pub async fn send_daily_affirmation(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    localizer: &Localizer,
) -> HandlerResult {
    let affirmation = match state.engine.get_daily_affirmation(&user_key(chat_id)).await {
        Ok(DailyAffirmation::Shown(affirmation)) => affirmation,
        Ok(DailyAffirmation::Empty(reason)) => {
            log::info!("No affirmation for chat {}: {:?}", chat_id.0, reason);
            bot.send_message(chat_id, text(reason.into(), localizer)).await?;
            return Ok(());
        }
        Err(e) => {
            log::error!("Failed to load daily affirmation for chat {}: {}", chat_id.0, e);
            bot.send_message(chat_id, text(MessageKey::TryAgain, localizer)).await?;
            return Ok(());
        }
    };

    let caption = format!("✨ {}", localizer.text(&affirmation.text));
    let image = localizer
        .url(&affirmation.image_urls())
        .and_then(|url| reqwest::Url::parse(&url).ok());

    if let Some(url) = image {
        match bot.send_photo(chat_id, InputFile::url(url)).caption(caption.clone()).await {
            Ok(_) => return Ok(()),
            Err(e) => log::warn!("Failed to send affirmation image to chat {}: {}", chat_id.0, e),
        }
    }

    bot.send_message(chat_id, caption).await?;
    Ok(())
}

async fn load_selection(
    state: &BotState,
    chat_id: ChatId,
) -> Result<(Vec<AffirmationCategory>, UserAffirmationPreferences), StoreError> {
    let categories = state.engine.categories().await?;
    let prefs = state.engine.load_preferences(&user_key(chat_id)).await?;
    Ok((categories, prefs))
}

pub async fn handle_categories(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    localizer: &Localizer,
) -> HandlerResult {
    let (categories, prefs) = match load_selection(state, chat_id).await {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load categories for chat {}: {}", chat_id.0, e);
            bot.send_message(chat_id, text(MessageKey::TryAgain, localizer)).await?;
            return Ok(());
        }
    };

    if categories.is_empty() {
        bot.send_message(chat_id, text(MessageKey::NoCategoriesExist, localizer)).await?;
        return Ok(());
    }

    bot.send_message(chat_id, text(MessageKey::ChooseCategories, localizer))
        .reply_markup(create_category_keyboard(
            &categories,
            &prefs.selected_categories,
            localizer,
            &text(MessageKey::ShowAffirmation, localizer),
        ))
        .await?;
    Ok(())
}

pub async fn handle_preferences(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    localizer: &Localizer,
) -> HandlerResult {
    let (categories, prefs) = match load_selection(state, chat_id).await {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load preferences for chat {}: {}", chat_id.0, e);
            bot.send_message(chat_id, text(MessageKey::TryAgain, localizer)).await?;
            return Ok(());
        }
    };

    // Show names where the category still exists, the raw id otherwise.
    let names: Vec<String> = prefs
        .selected_categories
        .iter()
        .map(|id| {
            categories
                .iter()
                .find(|c| c.id == *id)
                .map(|c| localizer.text(&c.name))
                .unwrap_or_else(|| id.clone())
        })
        .collect();
    let selection = if names.is_empty() {
        text(MessageKey::NothingSelected, localizer)
    } else {
        names.join(", ")
    };

    bot.send_message(
        chat_id,
        format!(
            "{}: {}\n{}: {}",
            text(MessageKey::SelectedCategories, localizer),
            selection,
            text(MessageKey::LastShown, localizer),
            prefs
                .last_affirmation_date
                .unwrap_or_else(|| text(MessageKey::Never, localizer)),
        ),
    )
    .await?;
    Ok(())
}

pub async fn handle_language(
    bot: &Bot,
    chat_id: ChatId,
    code: &str,
    state: &Arc<BotState>,
) -> HandlerResult {
    let language = state.set_language(chat_id.0, code).await;
    let localizer = Localizer::new(&language);
    log::info!("Chat {} switched language to {}", chat_id.0, language);

    bot.send_message(
        chat_id,
        format!("{} {}", text(MessageKey::LanguageSet, &localizer), language),
    )
    .await?;
    Ok(())
}
