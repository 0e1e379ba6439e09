use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::domain::error::{AppError, Result};

/// Runtime configuration. Values merge in increasing precedence:
/// `geopin.toml` in the working directory, an explicit `--config` file,
/// then `GEOPIN_`-prefixed environment variables (nested keys split on
/// `__`, e.g. `GEOPIN_GEMINI__MODEL`). Credentials are never compiled in.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub google_maps_api_key: String,

    /// Absent key disables both LLM steps.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// ISO 3166-1 alpha-2 country restriction for every geocoding call.
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_request_limit")]
    pub monthly_request_limit: u32,

    #[serde(default = "default_request_count_file")]
    pub request_count_file: PathBuf,

    #[serde(default)]
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            timeout_secs: 120,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_CONFIG_FILE: &'static str = "geopin.toml";
    pub const ENV_PREFIX: &'static str = "GEOPIN_";

    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(Self::DEFAULT_CONFIG_FILE));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))
    }

    pub fn llm_available(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

fn default_country() -> String {
    "JP".to_string()
}

fn default_request_limit() -> u32 {
    9800
}

fn default_request_count_file() -> PathBuf {
    PathBuf::from("request_count.json")
}
