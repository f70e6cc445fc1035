use chrono::Utc;
use indexmap::IndexMap;
use std::io::Read;
use std::path::Path;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::StoreError;
use crate::keyboard::MAX_CATEGORY_ID_LEN;
use crate::state::JsonStore;
use crate::types::{Affirmation, AffirmationCategory, BulkImportRow, LocalizedContent, LocalizedImages};

const REQUIRED_COLUMNS: [&str; 4] = ["es", "en", "category", "categoryTranslated"];
const BATCH_SIZE: usize = 500;

/// Rows of a bulk-import CSV along with its header line.
#[derive(Debug, Clone, Default)]
pub struct ImportFile {
    pub headers: Vec<String>,
    pub rows: Vec<BulkImportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories_count: usize,
    pub affirmations_count: usize,
}

pub fn read_rows(path: impl AsRef<Path>) -> Result<ImportFile, StoreError> {
    let file = std::fs::File::open(path)?;
    read_rows_from(file)
}

pub fn read_rows_from<R: Read>(reader: R) -> Result<ImportFile, StoreError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: BulkImportRow = result?;
        rows.push(row);
    }
    Ok(ImportFile { headers, rows })
}

/// Checks the header and every row, collecting all problems rather than
/// stopping at the first. Row numbers are 1-based.
pub fn validate_rows(file: &ImportFile) -> ValidationReport {
    let mut errors = Vec::new();

    if file.rows.is_empty() {
        errors.push("CSV file is empty".to_string());
        return ValidationReport { valid: false, errors };
    }

    for column in REQUIRED_COLUMNS {
        if !file.headers.iter().any(|h| h == column) {
            errors.push(format!("Missing required column: {}", column));
        }
    }

    for (index, row) in file.rows.iter().enumerate() {
        let line = index + 1;
        if row.es.trim().is_empty() {
            errors.push(format!("Row {}: Missing Spanish text", line));
        }
        if row.en.trim().is_empty() {
            errors.push(format!("Row {}: Missing English text", line));
        }
        if row.category.trim().is_empty() {
            errors.push(format!("Row {}: Missing category", line));
        }
        if row.category_translated.trim().is_empty() {
            errors.push(format!("Row {}: Missing category translation", line));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

/// Slug for a category name: lowercase ASCII, accents stripped, any other
/// run of characters collapsed to a single `-`. Capped so the id fits in a
/// keyboard button's callback data.
pub fn create_category_id(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut slug = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_matches('-');
    // ASCII only, so any byte index is a char boundary.
    let capped = &slug[..slug.len().min(MAX_CATEGORY_ID_LEN)];
    capped.trim_end_matches('-').to_string()
}

/// Writes the categories and affirmations described by `rows`. Categories
/// are deduplicated by slug; affirmations are written in batches.
pub async fn process_rows(store: &JsonStore, rows: &[BulkImportRow]) -> Result<ImportSummary, StoreError> {
    let now = Utc::now();
    let mut categories: IndexMap<String, AffirmationCategory> = IndexMap::new();
    let mut affirmations = Vec::with_capacity(rows.len());

    for row in rows {
        let category_id = create_category_id(&row.category);
        if category_id.is_empty() {
            return Err(StoreError::InvalidInput(format!(
                "category {:?} has no usable characters",
                row.category
            )));
        }

        categories
            .entry(category_id.clone())
            .or_insert_with(|| AffirmationCategory {
                id: category_id.clone(),
                name: LocalizedContent::new()
                    .with("es", row.category.trim())
                    .with("en", row.category_translated.trim()),
                description: None,
                enabled: true,
                created_at: now,
                updated_at: now,
            });

        let mut images = LocalizedImages::new();
        images.insert("en".to_string(), Vec::new());
        images.insert("es".to_string(), Vec::new());

        affirmations.push(Affirmation {
            id: String::new(),
            text: LocalizedContent::new().with("es", row.es.trim()).with("en", row.en.trim()),
            category: category_id,
            images,
            created_at: now,
            updated_at: now,
        });
    }

    let categories_count = store.upsert_categories(categories.into_values().collect()).await?;
    log::info!("Imported {} categories", categories_count);

    let affirmations_count = affirmations.len();
    let mut remaining = affirmations.into_iter().peekable();
    let mut imported = 0;
    while remaining.peek().is_some() {
        let batch: Vec<Affirmation> = remaining.by_ref().take(BATCH_SIZE).collect();
        let written = batch.len();
        store.insert_affirmations(batch).await?;
        log::info!("Imported affirmations {} to {}", imported + 1, imported + written);
        imported += written;
    }

    Ok(ImportSummary {
        categories_count,
        affirmations_count,
    })
}

/// Reads, validates and imports a CSV file in one go.
pub async fn import_csv(store: &JsonStore, path: impl AsRef<Path>) -> Result<ImportSummary, StoreError> {
    let path = path.as_ref();
    let file = read_rows(path)?;
    let report = validate_rows(&file);
    if !report.valid {
        return Err(StoreError::InvalidInput(format!(
            "{} failed validation: {}",
            path.display(),
            report.errors.join("; ")
        )));
    }
    process_rows(store, &file.rows).await
}
