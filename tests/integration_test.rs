#[cfg(test)]
mod tests {
    use chrono::Utc;
    use daily_affirmations::*;
    use std::collections::HashSet;
    use std::error::Error;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::{NamedTempFile, TempDir};

    // Clock whose date the test controls
    struct FixedClock {
        today: Mutex<String>,
    }

    impl FixedClock {
        fn new(today: &str) -> Arc<Self> {
            Arc::new(Self {
                today: Mutex::new(today.to_string()),
            })
        }

        fn advance_to(&self, day: &str) {
            *self.today.lock().unwrap() = day.to_string();
        }
    }

    impl Clock for FixedClock {
        fn today(&self) -> String {
            self.today.lock().unwrap().clone()
        }
    }

    // Random source that always picks the same index and counts its draws
    struct FixedIndex {
        index: usize,
        draws: Mutex<usize>,
    }

    impl FixedIndex {
        fn new(index: usize) -> Arc<Self> {
            Arc::new(Self {
                index,
                draws: Mutex::new(0),
            })
        }

        fn draws(&self) -> usize {
            *self.draws.lock().unwrap()
        }
    }

    impl RandomSource for FixedIndex {
        fn pick_index(&self, len: usize) -> usize {
            *self.draws.lock().unwrap() += 1;
            self.index.min(len - 1)
        }
    }

    fn category(id: &str) -> AffirmationCategory {
        AffirmationCategory {
            id: id.to_string(),
            name: LocalizedContent::new().with("en", id).with("es", id),
            description: None,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn affirmation(id: &str, category: &str) -> Affirmation {
        Affirmation {
            id: id.to_string(),
            text: LocalizedContent::new()
                .with("en", format!("I am {}", id))
                .with("es", format!("Soy {}", id)),
            category: category.to_string(),
            images: LocalizedImages::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // Store with the given categories and (id, category) affirmations
    async fn seeded_store(categories: &[&str], affirmations: &[(&str, &str)]) -> Arc<JsonStore> {
        let store = Arc::new(JsonStore::in_memory());
        store
            .upsert_categories(categories.iter().map(|id| category(id)).collect())
            .await
            .unwrap();
        store
            .insert_affirmations(affirmations.iter().map(|(id, cat)| affirmation(id, cat)).collect())
            .await
            .unwrap();
        store
    }

    fn engine(store: &Arc<JsonStore>, clock: &Arc<FixedClock>, random: &Arc<FixedIndex>) -> AffirmationEngine {
        AffirmationEngine::new(store.clone())
            .with_clock(clock.clone())
            .with_random(random.clone())
    }

    fn shown_id(outcome: &DailyAffirmation) -> String {
        outcome.affirmation().expect("expected an affirmation").id.clone()
    }

    // Test that repeated calls on the same day return the cached pick
    #[tokio::test]
    async fn test_same_day_calls_are_idempotent() {
        let store = seeded_store(&["calm"], &[("a1", "calm"), ("a2", "calm"), ("a3", "calm")]).await;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(1);
        let engine = engine(&store, &clock, &random);

        let first = shown_id(&engine.get_daily_affirmation("42").await.unwrap());
        for _ in 0..3 {
            let again = shown_id(&engine.get_daily_affirmation("42").await.unwrap());
            assert_eq!(again, first);
        }
        assert_eq!(random.draws(), 1);
    }

    // Test that a new day triggers exactly one new pick and persists it
    #[tokio::test]
    async fn test_rollover_picks_once_and_persists() {
        let store = seeded_store(&["calm"], &[("a1", "calm"), ("a2", "calm")]).await;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);
        let engine = engine(&store, &clock, &random);

        let day_one = shown_id(&engine.get_daily_affirmation("42").await.unwrap());
        clock.advance_to("2024-06-02");
        let day_two = shown_id(&engine.get_daily_affirmation("42").await.unwrap());
        engine.get_daily_affirmation("42").await.unwrap();

        assert_eq!(random.draws(), 2);
        assert_ne!(day_one, day_two);

        let prefs = store.get("42").await.unwrap().unwrap();
        assert_eq!(prefs.last_affirmation_date.as_deref(), Some("2024-06-02"));
        assert_eq!(prefs.last_affirmation_id.as_deref(), Some(day_two.as_str()));
    }

    // Test that the previous affirmation is skipped when another exists
    #[tokio::test]
    async fn test_no_repeat_when_alternatives_exist() {
        let store = seeded_store(&["calm"], &[("a1", "calm"), ("a2", "calm"), ("a3", "calm")]).await;
        let clock = FixedClock::new("2024-06-02");
        let random = FixedIndex::new(0);

        let mut prefs = UserAffirmationPreferences::new("7", vec!["calm".to_string()]);
        prefs.record_selection("2024-06-01".to_string(), "a1".to_string());
        store.put("7", &prefs, PutOptions::default()).await.unwrap();

        let engine = engine(&store, &clock, &random);
        let picked = shown_id(&engine.get_daily_affirmation("7").await.unwrap());
        assert_ne!(picked, "a1");
    }

    // Test that a single eligible affirmation may repeat rather than vanish
    #[tokio::test]
    async fn test_single_affirmation_repeats() {
        let store = seeded_store(&["calm"], &[("only", "calm")]).await;
        let clock = FixedClock::new("2024-06-02");
        let random = FixedIndex::new(0);

        let mut prefs = UserAffirmationPreferences::new("7", vec!["calm".to_string()]);
        prefs.record_selection("2024-06-01".to_string(), "only".to_string());
        store.put("7", &prefs, PutOptions::default()).await.unwrap();

        let engine = engine(&store, &clock, &random);
        let outcome = engine.get_daily_affirmation("7").await.unwrap();
        assert_eq!(shown_id(&outcome), "only");
    }

    // Test the three distinguishable empty states
    #[tokio::test]
    async fn test_empty_states_are_distinct() {
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);

        let store = seeded_store(&["calm", "x"], &[("a1", "calm")]).await;
        let engine = engine(&store, &clock, &random);

        engine.update_preferences("1", Vec::new()).await.unwrap();
        let outcome = engine.get_daily_affirmation("1").await.unwrap();
        assert_eq!(outcome.empty_reason(), Some(EmptyReason::NoCategoriesSelected));

        engine.update_preferences("2", vec!["x".to_string()]).await.unwrap();
        let outcome = engine.get_daily_affirmation("2").await.unwrap();
        assert_eq!(outcome.empty_reason(), Some(EmptyReason::NoCandidates));

        let bare = seeded_store(&[], &[]).await;
        let engine = AffirmationEngine::new(bare)
            .with_clock(clock.clone())
            .with_random(random.clone());
        let outcome = engine.get_daily_affirmation("3").await.unwrap();
        assert_eq!(outcome.empty_reason(), Some(EmptyReason::NoCategoriesExist));
        assert_eq!(random.draws(), 0);
    }

    // Test that first access selects every category known at that moment
    #[tokio::test]
    async fn test_default_preferences_snapshot_categories() {
        let store = seeded_store(&["calm", "health"], &[]).await;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);
        let engine = engine(&store, &clock, &random);

        let prefs = engine.load_preferences("9").await.unwrap();
        assert_eq!(prefs.selected_categories, vec!["calm", "health"]);

        store.upsert_categories(vec![category("sleep")]).await.unwrap();
        let prefs = engine.load_preferences("9").await.unwrap();
        assert_eq!(prefs.selected_categories, vec!["calm", "health"]);
    }

    // Test that a deleted cached affirmation is replaced instead of failing
    #[tokio::test]
    async fn test_deleted_cached_affirmation_self_heals() {
        let store = seeded_store(&["calm"], &[("a1", "calm"), ("a2", "calm")]).await;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);
        let engine = engine(&store, &clock, &random);

        let first = shown_id(&engine.get_daily_affirmation("5").await.unwrap());
        assert!(store.delete_affirmation(&first).await.unwrap());

        let healed = shown_id(&engine.get_daily_affirmation("5").await.unwrap());
        assert_ne!(healed, first);
        let prefs = store.get("5").await.unwrap().unwrap();
        assert_eq!(prefs.last_affirmation_id.as_deref(), Some(healed.as_str()));
    }

    // Test that changing categories is a plain write and never picks
    #[tokio::test]
    async fn test_update_preferences_replaces_selection_lazily() {
        let store = seeded_store(
            &["calm", "health"],
            &[("c1", "calm"), ("h1", "health")],
        )
        .await;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);
        let engine = engine(&store, &clock, &random);

        engine.update_preferences("3", vec!["calm".to_string()]).await.unwrap();
        let first = shown_id(&engine.get_daily_affirmation("3").await.unwrap());
        assert_eq!(first, "c1");

        let prefs = engine
            .update_preferences("3", vec!["health".to_string(), "health".to_string()])
            .await
            .unwrap();
        assert_eq!(prefs.selected_categories, vec!["health"]);
        assert_eq!(prefs.last_affirmation_id.as_deref(), Some("c1"));
        assert_eq!(random.draws(), 1);

        // Same day: the cached pick still stands until the next rollover
        assert_eq!(shown_id(&engine.get_daily_affirmation("3").await.unwrap()), "c1");

        clock.advance_to("2024-06-02");
        assert_eq!(shown_id(&engine.get_daily_affirmation("3").await.unwrap()), "h1");
    }

    // Test that toggling adds and removes a single category
    #[tokio::test]
    async fn test_toggle_category() {
        let store = seeded_store(&["calm", "health"], &[]).await;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);
        let engine = engine(&store, &clock, &random);

        let prefs = engine.toggle_category("4", "calm").await.unwrap();
        assert_eq!(prefs.selected_categories, vec!["health"]);

        let prefs = engine.toggle_category("4", "calm").await.unwrap();
        assert_eq!(prefs.selected_categories, vec!["health", "calm"]);
    }

    // Scenario: three mindfulness affirmations, no health ones
    #[tokio::test]
    async fn test_mindfulness_scenario() {
        let store = seeded_store(
            &["mindfulness", "health"],
            &[("m1", "mindfulness"), ("m2", "mindfulness"), ("m3", "mindfulness")],
        )
        .await;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);
        let engine = engine(&store, &clock, &random);

        engine
            .update_preferences("u", vec!["mindfulness".to_string(), "health".to_string()])
            .await
            .unwrap();

        let first = shown_id(&engine.get_daily_affirmation("u").await.unwrap());
        assert!(["m1", "m2", "m3"].contains(&first.as_str()));

        let second = shown_id(&engine.get_daily_affirmation("u").await.unwrap());
        assert_eq!(second, first);

        clock.advance_to("2024-06-02");
        let third = shown_id(&engine.get_daily_affirmation("u").await.unwrap());
        assert_ne!(third, first);
        assert_eq!(third, "m2");
    }

    // Test that an entropy-seeded engine only ever returns eligible ids
    #[tokio::test]
    async fn test_random_picks_stay_in_selected_categories() {
        let store = seeded_store(
            &["calm", "health"],
            &[("c1", "calm"), ("c2", "calm"), ("h1", "health")],
        )
        .await;
        let clock = FixedClock::new("2024-01-01");
        let engine = AffirmationEngine::new(store.clone())
            .with_clock(clock.clone())
            .with_random(Arc::new(StdRngSource::seeded(11)));
        engine.update_preferences("r", vec!["calm".to_string()]).await.unwrap();

        let mut seen = HashSet::new();
        for day in 1..=20 {
            clock.advance_to(&format!("2024-01-{:02}", day));
            seen.insert(shown_id(&engine.get_daily_affirmation("r").await.unwrap()));
        }
        assert!(seen.iter().all(|id| id.starts_with('c')));
        assert_eq!(seen.len(), 2);
    }

    // Test that the file store survives a reopen
    #[tokio::test]
    async fn test_json_store_persists_between_opens() -> Result<(), Box<dyn Error>> {
        let dir = TempDir::new()?;
        let clock = FixedClock::new("2024-06-01");
        let random = FixedIndex::new(0);

        let picked = {
            let store = Arc::new(JsonStore::open(dir.path()).await?);
            store.upsert_categories(vec![category("calm")]).await?;
            store
                .insert_affirmations(vec![affirmation("a1", "calm"), affirmation("a2", "calm")])
                .await?;
            let engine = engine(&store, &clock, &random);
            shown_id(&engine.get_daily_affirmation("42").await?)
        };

        let reopened = Arc::new(JsonStore::open(dir.path()).await?);
        assert_eq!(reopened.list_categories().await?.len(), 1);
        assert_eq!(reopened.affirmation_count().await?, 2);

        let engine = engine(&reopened, &clock, &random);
        assert_eq!(shown_id(&engine.get_daily_affirmation("42").await?), picked);
        assert_eq!(random.draws(), 1);
        Ok(())
    }

    // Test that a pick whose write failed is neither cached nor persisted
    #[tokio::test]
    async fn test_failed_selection_write_is_not_cached() -> Result<(), Box<dyn Error>> {
        let root = TempDir::new()?;
        let data_dir = root.path().join("data");
        let clock = FixedClock::new("2024-06-02");
        let random = FixedIndex::new(0);

        let store = Arc::new(JsonStore::open(&data_dir).await?);
        store.upsert_categories(vec![category("calm")]).await?;
        store
            .insert_affirmations(vec![affirmation("a1", "calm"), affirmation("a2", "calm")])
            .await?;
        let mut prefs = UserAffirmationPreferences::new("u", vec!["calm".to_string()]);
        prefs.record_selection("2024-06-01".to_string(), "a2".to_string());
        store.put("u", &prefs, PutOptions::default()).await?;

        std::fs::remove_dir_all(&data_dir)?;
        let engine = engine(&store, &clock, &random);

        let err = engine.get_daily_affirmation("u").await.unwrap_err();
        assert!(matches!(err, StoreError::IoError(_)));

        let stored = store.get("u").await?.unwrap();
        assert_eq!(stored.last_affirmation_date.as_deref(), Some("2024-06-01"));
        assert_eq!(stored.last_affirmation_id.as_deref(), Some("a2"));

        // Once the disk is back the day's pick is made and written afresh
        std::fs::create_dir_all(&data_dir)?;
        assert_eq!(shown_id(&engine.get_daily_affirmation("u").await?), "a1");
        assert_eq!(random.draws(), 2);

        let reopened = Arc::new(JsonStore::open(&data_dir).await?);
        let persisted = reopened.get("u").await?.unwrap();
        assert_eq!(persisted.last_affirmation_date.as_deref(), Some("2024-06-02"));
        assert_eq!(persisted.last_affirmation_id.as_deref(), Some("a1"));
        Ok(())
    }

    // Helper function to create a temporary bulk-import CSV
    fn create_import_csv(rows: &[&str]) -> Result<NamedTempFile, Box<dyn Error>> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "es,en,category,categoryTranslated")?;
        for row in rows {
            writeln!(temp_file, "{}", row)?;
        }
        Ok(temp_file)
    }

    // Test CSV import into the store
    #[tokio::test]
    async fn test_import_csv() -> Result<(), Box<dyn Error>> {
        let csv = create_import_csv(&[
            "Soy capaz,I am capable,Autoestima,Self-esteem",
            "Merezco amor,I deserve love,Autoestima,Self-esteem",
            "Respiro en calma,I breathe calmly,Meditación,Meditation",
        ])?;
        let store = Arc::new(JsonStore::in_memory());

        let summary = import_csv(&store, csv.path()).await?;
        assert_eq!(
            summary,
            ImportSummary {
                categories_count: 2,
                affirmations_count: 3,
            }
        );

        let categories = store.list_categories().await?;
        let ids: Vec<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["autoestima", "meditacion"]);
        assert_eq!(resolve_localized(&categories[1].name, "en"), "Meditation");
        assert_eq!(resolve_localized(&categories[1].name, "es"), "Meditación");

        let calm = store.list_by_categories(&["meditacion".to_string()]).await?;
        assert_eq!(calm.len(), 1);
        assert!(!calm[0].id.is_empty());
        assert_eq!(resolve_localized(&calm[0].text, "fr"), "I breathe calmly");
        assert!(calm[0].images.get("es").is_some_and(|images| images.is_empty()));
        Ok(())
    }

    // Test that an invalid CSV is rejected before anything is written
    #[tokio::test]
    async fn test_import_rejects_invalid_rows() -> Result<(), Box<dyn Error>> {
        let csv = create_import_csv(&["Soy capaz,,Autoestima,Self-esteem"])?;
        let store = Arc::new(JsonStore::in_memory());

        let err = import_csv(&store, csv.path()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(err.to_string().contains("Row 1: Missing English text"));
        assert!(store.list_categories().await?.is_empty());
        Ok(())
    }

    // Test batching with more rows than one batch holds
    #[tokio::test]
    async fn test_import_large_file() -> Result<(), Box<dyn Error>> {
        let rows: Vec<BulkImportRow> = (0..1203)
            .map(|i| BulkImportRow {
                es: format!("Afirmación {}", i),
                en: format!("Affirmation {}", i),
                category: if i % 2 == 0 { "Paz" } else { "Fuerza" }.to_string(),
                category_translated: if i % 2 == 0 { "Peace" } else { "Strength" }.to_string(),
            })
            .collect();
        let store = JsonStore::in_memory();

        let summary = process_rows(&store, &rows).await?;
        assert_eq!(summary.categories_count, 2);
        assert_eq!(summary.affirmations_count, 1203);
        assert_eq!(store.affirmation_count().await?, 1203);
        Ok(())
    }

    // Test that affirmation images resolve per language
    #[test]
    fn test_affirmation_image_resolution() {
        let mut affirmation = affirmation("img", "calm");
        affirmation.images.insert("es".to_string(), Vec::new());
        affirmation.images.insert(
            "en".to_string(),
            vec![AffirmationImage {
                url: "https://cdn.example.com/en.jpg".to_string(),
                width: 1080,
                height: 1920,
                aspect_ratio: "portrait".to_string(),
                style: None,
            }],
        );

        let urls = affirmation.image_urls();
        assert_eq!(
            Localizer::new("es").url(&urls).as_deref(),
            Some("https://cdn.example.com/en.jpg")
        );

        affirmation.images.clear();
        assert_eq!(Localizer::new("es").url(&affirmation.image_urls()), None);
    }

    // Test the keyboard marks the selected categories
    #[test]
    fn test_category_keyboard_marks_selection() {
        let categories = vec![category("calm"), category("health")];
        let keyboard = create_category_keyboard(
            &categories,
            &["health".to_string()],
            &Localizer::default(),
            "Show",
        );

        let rows = keyboard.inline_keyboard;
        assert_eq!(rows.len(), 3);
        assert!(rows[0][0].text.starts_with("▫️"));
        assert!(rows[1][0].text.starts_with("✅"));
        assert_eq!(rows[2][0].text, "Show");
    }

    #[test]
    fn test_parse_category_callback() {
        assert_eq!(parse_category_callback("cat:calm"), Some("calm"));
        assert_eq!(parse_category_callback("cat:"), None);
        assert_eq!(parse_category_callback(SHOW_AFFIRMATION_CALLBACK), None);
    }
}
