//! Gemini configuration: optional JSON file with env var fallbacks.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Stored model configuration (e.g. `llm-config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.into()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
        }
    }
}

impl GeminiConfig {
    /// Load config from file (if given and readable), falling back to env vars and defaults.
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config = config_path
            .map(Self::read_file)
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());

        match &config.api_key {
            Some(_) => info!("Gemini configured with model {}", config.model),
            None => warn!("GEMINI_API_KEY is not set; analysis requests will fail"),
        }
        config
    }

    fn read_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Env vars fill in the API key when the file has none, and override
    /// model and base URL when set.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = var("GEMINI_API_KEY").filter(|k| !k.is_empty());
        }
        if let Some(model) = var("GEMINI_MODEL").filter(|m| !m.is_empty()) {
            self.model = model;
        }
        if let Some(url) = var("GEMINI_BASE_URL").filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
