//! Configuration file management
//!
//! This module handles reading and writing configuration values to ~/.vectorsearch/config.toml
//! Configuration values can be overridden by environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::env::{apis as env_apis, store as env_store};
use crate::error::VectorSearchError;
use crate::vector_store::DistanceMetric;

pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub default_metric: DistanceMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_EMBEDDING_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
        }
    }
}

impl Config {
    /// Get the config file path (~/.vectorsearch/config.toml)
    pub fn get_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not find home directory")?;
        Ok(home_dir.join(".vectorsearch").join("config.toml"))
    }

    /// Load configuration from the default location.
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        // The file may hold an API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(config_path, permissions).with_context(|| {
                format!(
                    "Failed to set permissions on config file: {}",
                    config_path.display()
                )
            })?;
        }

        Ok(())
    }

    /// Get a config value by key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "default-metric" | "default_metric" => Some(self.store.default_metric.to_string()),
            "default-path" | "default_path" => self
                .store
                .default_path
                .as_ref()
                .map(|p| p.display().to_string()),
            "embedding-endpoint" | "embedding_endpoint" => Some(self.embedding.endpoint.clone()),
            "embedding-model" | "embedding_model" => Some(self.embedding.model.clone()),
            "api-key" | "api_key" => self.embedding.api_key.clone(),
            _ => None,
        }
    }

    /// Set a config value by key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "default-metric" | "default_metric" => {
                self.store.default_metric = value
                    .parse()
                    .map_err(VectorSearchError::invalid_config)?;
            }
            "default-path" | "default_path" => {
                self.store.default_path = Some(PathBuf::from(value));
            }
            "embedding-endpoint" | "embedding_endpoint" => {
                self.embedding.endpoint = value;
            }
            "embedding-model" | "embedding_model" => {
                self.embedding.model = value;
            }
            "api-key" | "api_key" => {
                self.embedding.api_key = Some(value);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Unset (reset) a config value by key
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "default-metric" | "default_metric" => {
                self.store.default_metric = DistanceMetric::default();
            }
            "default-path" | "default_path" => self.store.default_path = None,
            "embedding-endpoint" | "embedding_endpoint" => {
                self.embedding.endpoint = default_endpoint();
            }
            "embedding-model" | "embedding_model" => self.embedding.model = default_model(),
            "api-key" | "api_key" => self.embedding.api_key = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Get all config values as key-value pairs
    pub fn list(&self) -> Vec<(String, String)> {
        let mut items = vec![
            (
                "default-metric".to_string(),
                self.store.default_metric.to_string(),
            ),
            (
                "embedding-endpoint".to_string(),
                self.embedding.endpoint.clone(),
            ),
            ("embedding-model".to_string(), self.embedding.model.clone()),
        ];

        if let Some(ref path) = self.store.default_path {
            items.push(("default-path".to_string(), path.display().to_string()));
        }

        if let Some(ref key) = self.embedding.api_key {
            items.push(("api-key".to_string(), mask_api_key(key)));
        }

        items
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    VectorSearchError::invalid_config(format!("Unknown config key: {key}")).into()
}

/// Get the embedding API key with priority: environment variable > config file
pub fn get_api_key(config: &Config) -> Option<String> {
    if let Ok(key) = std::env::var(env_apis::OPENAI_API_KEY) {
        if !key.is_empty() {
            return Some(key);
        }
    }

    config.embedding.api_key.clone()
}

/// Resolve the store file path: explicit argument > environment > config file
pub fn resolve_store_path(explicit: Option<PathBuf>, config: &Config) -> Option<PathBuf> {
    explicit
        .or_else(|| std::env::var(env_store::STORE_PATH).ok().map(PathBuf::from))
        .or_else(|| config.store.default_path.clone())
}

/// Mask API key for display (show first 4 and last 4 characters)
fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "*".repeat(key.len());
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}
