use indexmap::IndexMap;

use crate::types::{Content, LocalizedContent};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Picks the text to show for `language`: the requested language, then
/// English (each only when non-empty), then whatever translation comes first.
/// Missing content yields "".
pub fn resolve(content: Option<&Content>, language: &str) -> String {
    match content {
        None => String::new(),
        Some(Content::Plain(text)) => text.clone(),
        Some(Content::Localized(map)) => resolve_localized(map, language),
    }
}

pub fn resolve_localized(content: &LocalizedContent, language: &str) -> String {
    let non_empty = |lang: &str| content.get(lang).filter(|text| !text.is_empty());

    non_empty(language)
        .or_else(|| non_empty(DEFAULT_LANGUAGE))
        .or_else(|| content.values().next())
        .unwrap_or_default()
        .to_string()
}

/// Same fallback order as [`resolve`], ending at the first url that is set at
/// all. `None` when no url exists so the caller can render a placeholder.
pub fn resolve_url(urls: &IndexMap<String, Option<String>>, language: &str) -> Option<String> {
    let present = |lang: &str| {
        urls.get(lang)
            .and_then(|url| url.as_deref())
            .filter(|url| !url.is_empty())
    };

    present(language)
        .or_else(|| present(DEFAULT_LANGUAGE))
        .or_else(|| urls.values().find_map(|url| url.as_deref()))
        .map(str::to_string)
}

/// Reduces a language tag such as `es-MX` or `EN_us` to its primary subtag.
pub fn normalize_language(code: &str) -> String {
    let primary = code
        .trim()
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if primary.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        primary
    }
}

/// Resolver bound to the active language of one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localizer {
    language: String,
}

impl Localizer {
    pub fn new(language: &str) -> Self {
        Self {
            language: normalize_language(language),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn text(&self, content: &LocalizedContent) -> String {
        resolve_localized(content, &self.language)
    }

    pub fn content(&self, content: Option<&Content>) -> String {
        resolve(content, &self.language)
    }

    pub fn url(&self, urls: &IndexMap<String, Option<String>>) -> Option<String> {
        resolve_url(urls, &self.language)
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}
