use crate::error::Result;
use config::{Environment, File};
use serde::Deserialize;

/// Application configuration.
///
/// Sources, later ones overriding earlier ones:
/// built-in defaults, `config/default.toml`, `config/local.toml`,
/// then `APP_*` environment variables (`__` separates nested keys,
/// e.g. `APP_EXTRACTION__API_KEY`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_acquire_timeout")]
    pub database_acquire_timeout_secs: u64,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Tuning for the fuzzy club search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_officer_roles")]
    pub officer_roles: Vec<String>,
    #[serde(default = "default_word_cutoff")]
    pub word_cutoff: f64,
    #[serde(default = "default_officer_cutoff")]
    pub officer_cutoff: f64,
}

/// External event-extraction service. Disabled while `api_key` is unset.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_extraction_base_url")]
    pub base_url: String,
    #[serde(default = "default_extraction_model")]
    pub model: String,
    #[serde(default = "default_extraction_timeout")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            officer_roles: default_officer_roles(),
            word_cutoff: default_word_cutoff(),
            officer_cutoff: default_officer_cutoff(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_extraction_base_url(),
            model: default_extraction_model(),
            timeout_secs: default_extraction_timeout(),
        }
    }
}

impl ExtractionConfig {
    /// True when an API key is present and non-blank.
    pub fn is_enabled(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "postgres://postgres@127.0.0.1:5432/ecn".to_string()
}

fn default_acquire_timeout() -> u64 {
    3
}

fn default_officer_roles() -> Vec<String> {
    vec![
        "president".to_string(),
        "vice president".to_string(),
        "treasurer".to_string(),
    ]
}

fn default_word_cutoff() -> f64 {
    0.82
}

fn default_officer_cutoff() -> f64 {
    0.86
}

fn default_extraction_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_extraction_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_extraction_timeout() -> u64 {
    5
}
