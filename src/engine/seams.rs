use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::types::{Affirmation, AffirmationCategory, UserAffirmationPreferences};

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<AffirmationCategory>, StoreError>;
}

#[async_trait]
pub trait AffirmationStore: Send + Sync {
    /// Every affirmation whose category is one of `category_ids`.
    async fn list_by_categories(&self, category_ids: &[String]) -> Result<Vec<Affirmation>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Affirmation>, StoreError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Merge into an existing record instead of replacing it, so fields the
    /// writer did not set are kept.
    pub merge_on_create: bool,
}

impl PutOptions {
    pub fn merge() -> Self {
        Self { merge_on_create: true }
    }
}

#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserAffirmationPreferences>, StoreError>;

    async fn put(
        &self,
        user_id: &str,
        record: &UserAffirmationPreferences,
        options: PutOptions,
    ) -> Result<(), StoreError>;
}

pub trait Clock: Send + Sync {
    /// Current calendar date as `YYYY-MM-DD`.
    fn today(&self) -> String;
}

/// UTC calendar date of the host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    }
}

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. Callers never pass `len == 0`.
    fn pick_index(&self, len: usize) -> usize;
}

pub struct StdRngSource {
    rng: Mutex<StdRng>,
}

impl StdRngSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for StdRngSource {
    fn pick_index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }
}
