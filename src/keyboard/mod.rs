use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::localization::Localizer;
use crate::types::AffirmationCategory;

pub const CATEGORY_CALLBACK_PREFIX: &str = "cat:";
pub const SHOW_AFFIRMATION_CALLBACK: &str = "show_affirmation";

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_DATA_LEN: usize = 64;
/// Longest category id that still fits in a toggle button's callback data.
pub const MAX_CATEGORY_ID_LEN: usize = MAX_CALLBACK_DATA_LEN - CATEGORY_CALLBACK_PREFIX.len();

/// One toggle button per category, selected ones marked with ✅, and a
/// final button to show today's affirmation. Categories whose id cannot fit
/// in callback data are left out so the rest of the keyboard still sends.
pub fn create_category_keyboard(
    categories: &[AffirmationCategory],
    selected: &[String],
    localizer: &Localizer,
    show_label: &str,
) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = categories
        .iter()
        .filter_map(|category| {
            let data = format!("{}{}", CATEGORY_CALLBACK_PREFIX, category.id);
            if data.len() > MAX_CALLBACK_DATA_LEN {
                log::warn!("Category id {:?} is too long for a keyboard button", category.id);
                return None;
            }

            let name = localizer.text(&category.name);
            let text = if selected.iter().any(|id| *id == category.id) {
                format!("✅ {}", name)
            } else {
                format!("▫️ {}", name)
            };
            Some(vec![InlineKeyboardButton::callback(text, data)])
        })
        .collect();

    keyboard.push(vec![InlineKeyboardButton::callback(
        show_label.to_string(),
        SHOW_AFFIRMATION_CALLBACK.to_string(),
    )]);

    InlineKeyboardMarkup::new(keyboard)
}

/// Category id carried by a toggle button's callback data.
pub fn parse_category_callback(data: &str) -> Option<&str> {
    data.strip_prefix(CATEGORY_CALLBACK_PREFIX)
        .filter(|id| !id.is_empty())
}
