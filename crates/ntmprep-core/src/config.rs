use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    pub prepare: PrepareConfig,
    pub vocabulary: VocabularyConfig,
    pub process: ProcessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub root: String,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub source_key: String,
    pub target_label: i64,
    pub output_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    pub input_key: String,
    pub output_prefix: String,
    pub demo_prefix: String,
    pub seed: u64,
    pub train_fraction: f64,
    pub min_document_chars: usize,
    pub demo_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub min_df: f64,
    pub max_df: f64,
    pub min_token_len: usize,
    pub stop_words: bool,
    /// Optional lemma dictionary file; the built-in English table is used otherwise.
    pub lemma_dictionary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub input_prefix: String,
    pub output_prefix: String,
    pub train_parts: usize,
    pub validation_parts: usize,
    pub test_parts: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { root: "./data".to_string(), bucket: "reviews".to_string() }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_key: "raw/reviews.csv".to_string(),
            target_label: 1,
            output_key: "filtered/negative_reviews.csv".to_string(),
        }
    }
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            input_key: "filtered/negative_reviews.csv".to_string(),
            output_prefix: "prepared".to_string(),
            demo_prefix: "demos".to_string(),
            seed: 42,
            train_fraction: 0.8,
            min_document_chars: 50,
            demo_count: 5,
        }
    }
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self { min_df: 0.01, max_df: 0.9, min_token_len: 2, stop_words: true, lemma_dictionary: None }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            input_prefix: "prepared".to_string(),
            output_prefix: "processed".to_string(),
            train_parts: 12,
            validation_parts: 1,
            test_parts: 1,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            ingest: IngestConfig::default(),
            prepare: PrepareConfig::default(),
            vocabulary: VocabularyConfig::default(),
            process: ProcessConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Merge defaults, `ntmprep.toml`, `ntmprep.<env>.toml` and `APP_*` env vars.
    ///
    /// The environment comes from `RUST_ENV` (default `dev`). Nested keys use a
    /// double underscore: `APP_PREPARE__SEED=7`.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("ntmprep.toml"))
    }

    pub fn load_from(base_file: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let config =
            Self::figment_for(base_file, &env_name).extract::<Self>().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment_for(base_file: &Path, env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default())).merge(Toml::file(base_file));
        let overlay = match env_name {
            "dev" | "development" => Some("dev"),
            "prod" | "production" => Some("prod"),
            "test" | "testing" => Some("test"),
            _ => None,
        };
        if let Some(suffix) = overlay {
            figment = figment.merge(Toml::file(base_file.with_extension(format!("{suffix}.toml"))));
        }
        figment.merge(Env::prefixed("APP_").split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.prepare;
        if !(0.0..=1.0).contains(&p.train_fraction) {
            return Err(Error::InvalidConfig(format!(
                "prepare.train_fraction must be in [0, 1], got {}",
                p.train_fraction
            )));
        }
        let v = &self.vocabulary;
        if !(0.0..=1.0).contains(&v.min_df) || !(0.0..=1.0).contains(&v.max_df) || v.min_df > v.max_df {
            return Err(Error::InvalidConfig(format!(
                "vocabulary df bounds must satisfy 0 <= min_df <= max_df <= 1, got [{}, {}]",
                v.min_df, v.max_df
            )));
        }
        let parts = [
            ("train", self.process.train_parts),
            ("validation", self.process.validation_parts),
            ("test", self.process.test_parts),
        ];
        for (name, n) in parts {
            if n == 0 {
                return Err(Error::InvalidConfig(format!("process.{name}_parts must be at least 1")));
            }
        }
        if self.store.bucket.is_empty() {
            return Err(Error::InvalidConfig("store.bucket must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn store_root(&self) -> PathBuf {
        expand_path(&self.store.root)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
