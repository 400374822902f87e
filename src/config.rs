//! Storefront configuration.
//!
//! Every field has a default, so an empty (or absent) file is a valid config.
//! `ECONEST_CONFIG` names a TOML file to load; `ECONEST_API_URL` overrides the
//! catalog base URL on top of whatever the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "ECONEST_CONFIG";
/// Env var overriding [`StorefrontConfig::api_base_url`].
pub const API_URL_ENV: &str = "ECONEST_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid api_base_url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Quiet period of the product search, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub tag_search_debounce_ms: u64,

    /// Max tags returned by one auto-complete lookup.
    #[serde(default = "default_tag_search_limit")]
    pub tag_search_limit: u32,

    /// Command buffer of every controller.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            search_debounce_ms: default_debounce_ms(),
            tag_search_debounce_ms: default_debounce_ms(),
            tag_search_limit: default_tag_search_limit(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_tag_search_limit() -> u32 {
    10
}

fn default_channel_capacity() -> usize {
    32
}

impl StorefrontConfig {
    /// Loads from `ECONEST_CONFIG` (or defaults) and applies `ECONEST_API_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let api_url = std::env::var(API_URL_ENV).ok();
        Self::load_from(path.as_deref(), api_url)
    }

    pub fn load_from(path: Option<&Path>, api_url: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&content)?
            }
            None => Self::default(),
        };
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            config.api_base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.api_base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Zero("channel_capacity"));
        }
        if self.tag_search_limit == 0 {
            return Err(ConfigError::Zero("tag_search_limit"));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn tag_search_debounce(&self) -> Duration {
        Duration::from_millis(self.tag_search_debounce_ms)
    }
}
