use std::sync::Arc;

use crate::error::StoreError;
use crate::types::{Affirmation, AffirmationCategory, UserAffirmationPreferences};

mod seams;
pub use seams::*;

/// Why no affirmation can be shown today. Each maps to its own empty-state
/// message in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoCategoriesExist,
    NoCategoriesSelected,
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DailyAffirmation {
    Shown(Affirmation),
    Empty(EmptyReason),
}

impl DailyAffirmation {
    pub fn affirmation(&self) -> Option<&Affirmation> {
        match self {
            DailyAffirmation::Shown(affirmation) => Some(affirmation),
            DailyAffirmation::Empty(_) => None,
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            DailyAffirmation::Shown(_) => None,
            DailyAffirmation::Empty(reason) => Some(*reason),
        }
    }
}

pub struct AffirmationEngine {
    categories: Arc<dyn CategoryStore>,
    affirmations: Arc<dyn AffirmationStore>,
    preferences: Arc<dyn PreferencesStore>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl AffirmationEngine {
    /// Engine over a single store that serves all three collections, with
    /// the system clock and an entropy-seeded generator.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: CategoryStore + AffirmationStore + PreferencesStore + 'static,
    {
        Self {
            categories: store.clone(),
            affirmations: store.clone(),
            preferences: store,
            clock: Arc::new(SystemClock),
            random: Arc::new(StdRngSource::from_entropy()),
        }
    }

    pub fn from_parts(
        categories: Arc<dyn CategoryStore>,
        affirmations: Arc<dyn AffirmationStore>,
        preferences: Arc<dyn PreferencesStore>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            categories,
            affirmations,
            preferences,
            clock,
            random,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub async fn categories(&self) -> Result<Vec<AffirmationCategory>, StoreError> {
        self.categories.list_categories().await
    }

    /// Reads the user's preferences, creating them on first access with every
    /// category known right now selected. Categories added later are not
    /// added to existing records.
    pub async fn load_preferences(&self, user_id: &str) -> Result<UserAffirmationPreferences, StoreError> {
        let categories = self.categories.list_categories().await?;
        self.load_preferences_with(user_id, &categories).await
    }

    async fn load_preferences_with(
        &self,
        user_id: &str,
        categories: &[AffirmationCategory],
    ) -> Result<UserAffirmationPreferences, StoreError> {
        check_user_id(user_id)?;

        if let Some(prefs) = self.preferences.get(user_id).await? {
            return Ok(prefs);
        }

        let defaults = UserAffirmationPreferences::new(
            user_id,
            categories.iter().map(|c| c.id.clone()).collect(),
        );
        self.preferences.put(user_id, &defaults, PutOptions::merge()).await?;
        log::info!(
            "Created default affirmation preferences for user {} with {} categories",
            user_id,
            defaults.selected_categories.len()
        );
        Ok(defaults)
    }

    /// Today's affirmation for `user_id`. The first call of a day picks one at
    /// random and records it; later calls that day return the same one.
    pub async fn get_daily_affirmation(&self, user_id: &str) -> Result<DailyAffirmation, StoreError> {
        let categories = self.categories.list_categories().await?;
        let prefs = self.load_preferences_with(user_id, &categories).await?;
        self.daily_for(prefs, &categories).await
    }

    async fn daily_for(
        &self,
        mut prefs: UserAffirmationPreferences,
        categories: &[AffirmationCategory],
    ) -> Result<DailyAffirmation, StoreError> {
        let today = self.clock.today();

        if prefs.selected_categories.is_empty() {
            return Ok(DailyAffirmation::Empty(empty_reason(categories, &prefs)));
        }

        if prefs.last_affirmation_date.as_deref() == Some(today.as_str()) {
            if let Some(id) = prefs.last_affirmation_id.as_deref() {
                match self.affirmations.get_by_id(id).await? {
                    Some(affirmation) => {
                        log::debug!("Returning cached affirmation {} for user {}", id, prefs.user_id);
                        return Ok(DailyAffirmation::Shown(affirmation));
                    }
                    None => {
                        log::debug!(
                            "Cached affirmation {} for user {} no longer exists, picking a new one",
                            id,
                            prefs.user_id
                        );
                    }
                }
            }
        }

        let pool = self
            .affirmations
            .list_by_categories(&prefs.selected_categories)
            .await?;
        if pool.is_empty() {
            return Ok(DailyAffirmation::Empty(empty_reason(categories, &prefs)));
        }

        let previous = prefs.last_affirmation_id.as_deref();
        let mut candidates: Vec<&Affirmation> = pool
            .iter()
            .filter(|a| Some(a.id.as_str()) != previous)
            .collect();
        if candidates.is_empty() {
            candidates = pool.iter().collect();
        }

        let index = self.random.pick_index(candidates.len()).min(candidates.len() - 1);
        let selected = candidates[index].clone();

        prefs.record_selection(today, selected.id.clone());
        self.preferences
            .put(&prefs.user_id, &prefs, PutOptions::merge())
            .await?;

        log::info!(
            "Picked affirmation {} for user {} out of {} candidates",
            selected.id,
            prefs.user_id,
            candidates.len()
        );
        Ok(DailyAffirmation::Shown(selected))
    }

    /// Replaces the selected categories. The next `get_daily_affirmation`
    /// re-evaluates against the new selection; nothing is picked here.
    pub async fn update_preferences(
        &self,
        user_id: &str,
        category_ids: Vec<String>,
    ) -> Result<UserAffirmationPreferences, StoreError> {
        check_user_id(user_id)?;

        let mut prefs = match self.preferences.get(user_id).await? {
            Some(prefs) => prefs,
            None => UserAffirmationPreferences::new(user_id, Vec::new()),
        };
        prefs.set_categories(category_ids);
        self.preferences.put(user_id, &prefs, PutOptions::merge()).await?;

        log::info!(
            "Updated affirmation categories for user {}: {:?}",
            user_id,
            prefs.selected_categories
        );
        Ok(prefs)
    }

    /// Adds the category when it is not selected, removes it otherwise.
    pub async fn toggle_category(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> Result<UserAffirmationPreferences, StoreError> {
        let prefs = self.load_preferences(user_id).await?;

        let selection = if prefs.is_selected(category_id) {
            prefs
                .selected_categories
                .into_iter()
                .filter(|id| id != category_id)
                .collect()
        } else {
            let mut selection = prefs.selected_categories;
            selection.push(category_id.to_string());
            selection
        };

        self.update_preferences(user_id, selection).await
    }
}

fn check_user_id(user_id: &str) -> Result<(), StoreError> {
    if user_id.trim().is_empty() {
        return Err(StoreError::InvalidInput("user id must not be empty".to_string()));
    }
    Ok(())
}

fn empty_reason(categories: &[AffirmationCategory], prefs: &UserAffirmationPreferences) -> EmptyReason {
    if categories.is_empty() {
        EmptyReason::NoCategoriesExist
    } else if prefs.selected_categories.is_empty() {
        EmptyReason::NoCategoriesSelected
    } else {
        EmptyReason::NoCandidates
    }
}
