use crate::report::llm_client::LLMProvider;
use crate::report::localize::RegionMapping;
use crate::report::pipeline::DEFAULT_SUMMARIZE_CHARS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const APP_DIR_NAME: &str = "Exec Report Pack";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// User preferences for report generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub provider: LLMProvider,
    /// Model id; the provider default is used when unset
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// CSV: keep the first N rows
    pub sample_rows: usize,
    /// Summarize input locally before generation
    pub summarize: bool,
    pub summarize_chars: usize,
    /// Log raw API payloads and responses
    pub debug: bool,
    pub regions: RegionMapping,
    /// Read templates from here instead of the built-in copies
    pub templates_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Preview,
            model: None,
            temperature: 0.1,
            max_tokens: 400,
            sample_rows: 5,
            summarize: true,
            summarize_chars: DEFAULT_SUMMARIZE_CHARS,
            debug: false,
            regions: RegionMapping::default(),
            templates_dir: None,
        }
    }
}

/// Get the platform-specific config file path
///
/// - macOS: ~/Library/Application Support/Exec Report Pack/config.json
/// - Windows: %APPDATA%\Exec Report Pack\config.json
/// - Linux: ~/.local/share/Exec Report Pack/config.json
pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::data_dir()?;
    path.push(APP_DIR_NAME);
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

impl ReportConfig {
    /// Load preferences
    ///
    /// An explicit path must exist. Without one the default location is
    /// tried and a missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: ReportConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        info!("Loaded config from {:?}", path);
        Ok(config.clamped())
    }

    /// Keep numeric settings inside the ranges the generator supports
    pub fn clamped(mut self) -> Self {
        self.temperature = self.temperature.clamp(0.0, 1.0);
        self.max_tokens = self.max_tokens.clamp(128, 1024);
        self.sample_rows = self.sample_rows.clamp(1, 1000);
        self.summarize_chars = self.summarize_chars.clamp(300, 3000);
        self
    }

    /// Configured model, or the provider's default
    pub fn model_for(&self, provider: LLMProvider) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string())
    }
}

/// API key for a provider from its environment variable
pub fn api_key_from_env(provider: LLMProvider) -> Option<String> {
    provider
        .api_key_env()
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.trim().is_empty())
}
