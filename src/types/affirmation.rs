use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::LocalizedContent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffirmationCategory {
    pub id: String,
    pub name: LocalizedContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedContent>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffirmationImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// "square", "portrait" or "landscape".
    pub aspect_ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

pub type LocalizedImages = IndexMap<String, Vec<AffirmationImage>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affirmation {
    #[serde(default)]
    pub id: String,
    pub text: LocalizedContent,
    pub category: String,
    #[serde(default)]
    pub images: LocalizedImages,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Affirmation {
    /// First image url per language, `None` for languages with no images.
    pub fn image_urls(&self) -> IndexMap<String, Option<String>> {
        self.images
            .iter()
            .map(|(lang, images)| (lang.clone(), images.first().map(|img| img.url.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAffirmationPreferences {
    pub user_id: String,
    #[serde(default)]
    pub selected_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_style: Option<String>,
    /// `YYYY-MM-DD`; always written together with `last_affirmation_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_affirmation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_affirmation_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserAffirmationPreferences {
    pub fn new(user_id: impl Into<String>, selected_categories: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            selected_categories: dedup_ids(selected_categories),
            preferred_style: None,
            last_affirmation_date: None,
            last_affirmation_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn set_categories(&mut self, category_ids: Vec<String>) {
        self.selected_categories = dedup_ids(category_ids);
        self.updated_at = Utc::now();
    }

    pub fn record_selection(&mut self, date: String, affirmation_id: String) {
        self.last_affirmation_date = Some(date);
        self.last_affirmation_id = Some(affirmation_id);
        self.updated_at = Utc::now();
    }

    pub fn is_selected(&self, category_id: &str) -> bool {
        self.selected_categories.iter().any(|id| id == category_id)
    }
}

fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// One line of the admin bulk-import CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportRow {
    #[serde(default)]
    pub es: String,
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_translated: String,
}
