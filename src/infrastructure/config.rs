// src/infrastructure/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{
    AUTH_TOKEN_ENV_VAR, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_URL_EXPIRY_SECS,
};
use crate::domain::DomainError;

/// TOML configuration for the notes backend
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub level: AccessLevel,
    #[serde(default)]
    pub identity_id: String,
    #[serde(default = "default_url_expiry_secs")]
    pub url_expiry_secs: u64,
}

/// Visibility of stored images; decides the object path prefix
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Public,
    Protected,
    #[default]
    Private,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::Protected => "protected",
            AccessLevel::Private => "private",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_timeout_secs() -> u64 { DEFAULT_HTTP_TIMEOUT_SECS }
fn default_url_expiry_secs() -> u64 { DEFAULT_URL_EXPIRY_SECS }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            auth_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            level: AccessLevel::default(),
            identity_id: String::new(),
            url_expiry_secs: default_url_expiry_secs(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Default location: `<config dir>/personal-notes/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not find config directory")?;
        Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Take the auth token from the environment when it is set there
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = env::var(AUTH_TOKEN_ENV_VAR) {
            if !token.is_empty() {
                self.api.auth_token = Some(token);
            }
        }
    }

    /// Check that both backends are reachable in principle
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.api.endpoint.is_empty() {
            return Err(DomainError::Config("api.endpoint is not set".to_string()));
        }
        if self.storage.endpoint.is_empty() {
            return Err(DomainError::Config("storage.endpoint is not set".to_string()));
        }
        if self.storage.level != AccessLevel::Public && self.storage.identity_id.is_empty() {
            return Err(DomainError::Config(format!(
                "storage.identity_id is required for {} storage",
                self.storage.level
            )));
        }
        Ok(())
    }
}
