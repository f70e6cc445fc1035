use async_trait::async_trait;
use indexmap::IndexMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;

use crate::engine::{AffirmationStore, CategoryStore, PreferencesStore, PutOptions};
use crate::error::StoreError;
use crate::types::{Affirmation, AffirmationCategory, UserAffirmationPreferences};

const CATEGORIES_FILE: &str = "categories.json";
const AFFIRMATIONS_FILE: &str = "affirmations.json";
const PREFERENCES_FILE: &str = "preferences.json";
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const GENERATED_ID_LEN: usize = 20;

/// Document store backed by one JSON file per collection. Collections live
/// in memory; a write is applied to a copy, flushed to disk, and only then
/// becomes visible, so a failed flush leaves the store unchanged.
pub struct JsonStore {
    dir: Option<PathBuf>,
    categories: Mutex<IndexMap<String, AffirmationCategory>>,
    affirmations: Mutex<IndexMap<String, Affirmation>>,
    preferences: Mutex<IndexMap<String, UserAffirmationPreferences>>,
}

impl JsonStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let categories = load_collection(&dir.join(CATEGORIES_FILE)).await?;
        let affirmations = load_collection(&dir.join(AFFIRMATIONS_FILE)).await?;
        let preferences = load_collection(&dir.join(PREFERENCES_FILE)).await?;

        Ok(Self {
            dir: Some(dir),
            categories: Mutex::new(categories),
            affirmations: Mutex::new(affirmations),
            preferences: Mutex::new(preferences),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            dir: None,
            categories: Mutex::new(IndexMap::new()),
            affirmations: Mutex::new(IndexMap::new()),
            preferences: Mutex::new(IndexMap::new()),
        }
    }

    /// Inserts or replaces categories by id. Returns how many were written.
    pub async fn upsert_categories(&self, categories: Vec<AffirmationCategory>) -> Result<usize, StoreError> {
        let mut stored = acquire(&self.categories).await?;
        let count = categories.len();
        let mut next = stored.clone();
        for category in categories {
            next.insert(category.id.clone(), category);
        }
        self.flush(CATEGORIES_FILE, &next).await?;
        *stored = next;
        Ok(count)
    }

    /// Inserts affirmations, generating ids for those without one. Returns
    /// the ids in input order.
    pub async fn insert_affirmations(&self, affirmations: Vec<Affirmation>) -> Result<Vec<String>, StoreError> {
        let mut stored = acquire(&self.affirmations).await?;
        let mut ids = Vec::with_capacity(affirmations.len());
        let mut next = stored.clone();
        for mut affirmation in affirmations {
            if affirmation.id.is_empty() {
                affirmation.id = generate_id(|id| next.contains_key(id));
            }
            ids.push(affirmation.id.clone());
            next.insert(affirmation.id.clone(), affirmation);
        }
        self.flush(AFFIRMATIONS_FILE, &next).await?;
        *stored = next;
        Ok(ids)
    }

    pub async fn delete_affirmation(&self, id: &str) -> Result<bool, StoreError> {
        let mut stored = acquire(&self.affirmations).await?;
        if !stored.contains_key(id) {
            return Ok(false);
        }
        let mut next = stored.clone();
        next.shift_remove(id);
        self.flush(AFFIRMATIONS_FILE, &next).await?;
        *stored = next;
        Ok(true)
    }

    pub async fn affirmation_count(&self) -> Result<usize, StoreError> {
        Ok(acquire(&self.affirmations).await?.len())
    }

    async fn flush<T: Serialize>(&self, file_name: &str, collection: &T) -> Result<(), StoreError> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(collection)?;

        // Write to a temporary file first, then swap it in.
        let temp_path = dir.join(format!("{}.tmp", file_name));
        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(json.as_bytes()).await?;
        temp_file.flush().await?;
        tokio::fs::rename(&temp_path, dir.join(file_name)).await?;

        Ok(())
    }
}

#[async_trait]
impl CategoryStore for JsonStore {
    async fn list_categories(&self) -> Result<Vec<AffirmationCategory>, StoreError> {
        let stored = acquire(&self.categories).await?;
        Ok(stored.values().cloned().collect())
    }
}

#[async_trait]
impl AffirmationStore for JsonStore {
    async fn list_by_categories(&self, category_ids: &[String]) -> Result<Vec<Affirmation>, StoreError> {
        let stored = acquire(&self.affirmations).await?;
        Ok(stored
            .values()
            .filter(|a| category_ids.iter().any(|id| *id == a.category))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Affirmation>, StoreError> {
        let stored = acquire(&self.affirmations).await?;
        Ok(stored.get(id).cloned())
    }
}

#[async_trait]
impl PreferencesStore for JsonStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserAffirmationPreferences>, StoreError> {
        let stored = acquire(&self.preferences).await?;
        Ok(stored.get(user_id).cloned())
    }

    async fn put(
        &self,
        user_id: &str,
        record: &UserAffirmationPreferences,
        options: PutOptions,
    ) -> Result<(), StoreError> {
        let mut stored = acquire(&self.preferences).await?;
        let merged = match (options.merge_on_create, stored.get(user_id)) {
            (true, Some(existing)) => merge_preferences(existing, record),
            _ => record.clone(),
        };
        let mut next = stored.clone();
        next.insert(user_id.to_string(), merged);
        self.flush(PREFERENCES_FILE, &next).await?;
        *stored = next;
        Ok(())
    }
}

/// Fields set on `update` win; unset optional fields keep the stored value.
fn merge_preferences(
    existing: &UserAffirmationPreferences,
    update: &UserAffirmationPreferences,
) -> UserAffirmationPreferences {
    UserAffirmationPreferences {
        user_id: update.user_id.clone(),
        selected_categories: update.selected_categories.clone(),
        preferred_style: update.preferred_style.clone().or_else(|| existing.preferred_style.clone()),
        last_affirmation_date: update
            .last_affirmation_date
            .clone()
            .or_else(|| existing.last_affirmation_date.clone()),
        last_affirmation_id: update
            .last_affirmation_id
            .clone()
            .or_else(|| existing.last_affirmation_id.clone()),
        updated_at: update.updated_at,
    }
}

async fn acquire<T>(lock: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    match timeout(LOCK_TIMEOUT, lock.lock()).await {
        Ok(guard) => Ok(guard),
        Err(_) => {
            log::error!("Timeout while acquiring store lock");
            Err(StoreError::Unavailable("lock acquisition timeout".to_string()))
        }
    }
}

async fn load_collection<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("No {} yet, starting empty", path.display());
        return Ok(T::default());
    }

    log::info!("Loading {}", path.display());
    let json = tokio::fs::read_to_string(path).await?;
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&json)?)
}

fn generate_id(taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let id: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(GENERATED_ID_LEN)
            .map(char::from)
            .collect();
        if !taken(&id) {
            return id;
        }
    }
}
