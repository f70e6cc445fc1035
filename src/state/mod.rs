use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::engine::{AffirmationEngine, StdRngSource};
use crate::error::StoreError;
use crate::localization::{normalize_language, Localizer};

mod store;
pub use store::*;

pub struct BotState {
    pub engine: AffirmationEngine,
    pub store: Arc<JsonStore>,
    pub config: Config,
    pub chat_languages: Mutex<HashMap<i64, String>>,
}

impl BotState {
    pub async fn initialize(config: Config) -> Result<Self, StoreError> {
        let store = Arc::new(JsonStore::open(&config.data_dir).await?);
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<JsonStore>) -> Self {
        let random = match config.rng_seed {
            Some(seed) => StdRngSource::seeded(seed),
            None => StdRngSource::from_entropy(),
        };
        let engine = AffirmationEngine::new(store.clone()).with_random(Arc::new(random));

        Self {
            engine,
            store,
            config,
            chat_languages: Mutex::new(HashMap::new()),
        }
    }

    /// Language for a chat: an explicit `/language` choice, then the
    /// client's reported language, then the configured default.
    pub async fn localizer_for(&self, chat_id: i64, client_language: Option<&str>) -> Localizer {
        let languages = self.chat_languages.lock().await;
        let language = languages
            .get(&chat_id)
            .map(String::as_str)
            .or(client_language)
            .unwrap_or(&self.config.default_language);
        Localizer::new(language)
    }

    pub async fn set_language(&self, chat_id: i64, code: &str) -> String {
        let language = normalize_language(code);
        self.chat_languages.lock().await.insert(chat_id, language.clone());
        language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chat_language_overrides_client_language() {
        let state = BotState::with_store(Config::default(), Arc::new(JsonStore::in_memory()));

        assert_eq!(state.localizer_for(1, None).await.language(), "en");
        assert_eq!(state.localizer_for(1, Some("es-AR")).await.language(), "es");

        assert_eq!(state.set_language(1, "FR").await, "fr");
        assert_eq!(state.localizer_for(1, Some("es")).await.language(), "fr");
        assert_eq!(state.localizer_for(2, Some("es")).await.language(), "es");
    }
}
