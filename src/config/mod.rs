use std::env;
use std::path::PathBuf;

use crate::localization::{normalize_language, DEFAULT_LANGUAGE};

const DATA_DIR_VAR: &str = "AFFIRMATIONS_DATA_DIR";
const DEFAULT_LANGUAGE_VAR: &str = "AFFIRMATIONS_DEFAULT_LANGUAGE";
const IMPORT_CSV_VAR: &str = "AFFIRMATIONS_IMPORT_CSV";
const RNG_SEED_VAR: &str = "AFFIRMATIONS_RNG_SEED";

/// Runtime settings read from the environment. `main` loads `.env` into the
/// environment beforehand. The bot token itself is read by teloxide from
/// `TELOXIDE_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_language: String,
    pub import_csv: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_language: DEFAULT_LANGUAGE.to_string(),
            import_csv: None,
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let rng_seed = non_empty(RNG_SEED_VAR).and_then(|seed| match seed.trim().parse() {
            Ok(seed) => Some(seed),
            Err(e) => {
                log::warn!("Ignoring invalid {}={}: {}", RNG_SEED_VAR, seed, e);
                None
            }
        });

        Self {
            data_dir: non_empty(DATA_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            default_language: non_empty(DEFAULT_LANGUAGE_VAR)
                .map(|lang| normalize_language(&lang))
                .unwrap_or(defaults.default_language),
            import_csv: non_empty(IMPORT_CSV_VAR).map(PathBuf::from),
            rng_seed,
        }
    }
}
