use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

mod affirmation;
pub use affirmation::*;

/// Text keyed by language code, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedContent(IndexMap<String, String>);

impl LocalizedContent {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(language, text);
        self
    }

    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.0.insert(language.into(), text.into());
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedContent {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Displayable text as it arrives from storage: either already a single
/// string or a per-language mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Plain(String),
    Localized(LocalizedContent),
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Plain(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Plain(text.to_string())
    }
}

impl From<LocalizedContent> for Content {
    fn from(content: LocalizedContent) -> Self {
        Content::Localized(content)
    }
}
