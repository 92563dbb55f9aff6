use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub segmenter: SegmenterSettings,
}

/// Transcription API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub language: Option<String>,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

/// Audio segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterSettings {
    pub max_segment_bytes: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: defaults::DEFAULT_MODEL.to_string(),
            language: None,
            max_attempts: defaults::MAX_ATTEMPTS,
            initial_backoff_ms: defaults::INITIAL_BACKOFF_MS,
        }
    }
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            max_segment_bytes: defaults::MAX_SEGMENT_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    // Re-panic on invalid TOML or other errors
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PODSCRIBE_API_KEY (falls back to OPENAI_API_KEY) → api.api_key
    /// - PODSCRIBE_MODEL → api.model
    /// - PODSCRIBE_LANGUAGE → api.language
    /// - PODSCRIBE_BASE_URL → api.base_url
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("PODSCRIBE_API_KEY")
            && !key.is_empty()
        {
            self.api.api_key = Some(key);
        } else if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
            && self.api.api_key.is_none()
        {
            self.api.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("PODSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.api.model = model;
        }

        if let Ok(language) = std::env::var("PODSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.api.language = Some(language);
        }

        if let Ok(base_url) = std::env::var("PODSCRIBE_BASE_URL")
            && !base_url.is_empty()
        {
            self.api.base_url = base_url;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/podscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("podscribe")
            .join("config.toml")
    }
}
