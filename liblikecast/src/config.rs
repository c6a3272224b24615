//! Configuration management for Likecast

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credentials::Credentials;
use crate::error::{ConfigError, Result};
use crate::platforms::twitter;
use crate::rate_limiter::{DEFAULT_FALLBACK_RETRY_SECS, DEFAULT_QUOTA, DEFAULT_WINDOW_SECS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Settings for the shared-password gate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared password required before any action; no gate when unset
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // Default credential values; command-line flags and env vars override them
    pub bearer_token: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_secret: Option<String>,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            bearer_token: None,
            api_key: None,
            api_secret: None,
            access_token: None,
            access_secret: None,
        }
    }
}

/// Quota assumptions for the like action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_quota")]
    pub quota: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_fallback_retry_secs")]
    pub fallback_retry_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            quota: default_quota(),
            window_secs: default_window_secs(),
            fallback_retry_secs: default_fallback_retry_secs(),
        }
    }
}

fn default_api_base() -> String {
    twitter::DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_quota() -> u32 {
    DEFAULT_QUOTA
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

fn default_fallback_retry_secs() -> u64 {
    DEFAULT_FALLBACK_RETRY_SECS
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error: defaults are returned instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Password the gate should expect, if one is configured
    pub fn gate_password(&self) -> Option<SecretString> {
        self.app
            .password
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|p| SecretString::from(p.clone()))
    }
}

impl TwitterConfig {
    /// Merge explicit values over the configured defaults
    ///
    /// Each `Some` in `overrides` wins; missing values become empty strings and
    /// are reported by [`Credentials::missing_fields`].
    pub fn credentials(&self, overrides: CredentialOverrides) -> Credentials {
        let pick = |explicit: Option<String>, fallback: &Option<String>| {
            explicit.or_else(|| fallback.clone()).unwrap_or_default()
        };

        Credentials::new(
            pick(overrides.bearer_token, &self.bearer_token),
            pick(overrides.api_key, &self.api_key),
            pick(overrides.api_secret, &self.api_secret),
            pick(overrides.access_token, &self.access_token),
            pick(overrides.access_secret, &self.access_secret),
        )
    }
}

/// Credential values supplied outside the config file
#[derive(Debug, Default)]
pub struct CredentialOverrides {
    pub bearer_token: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_secret: Option<String>,
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("LIKECAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("likecast").join("config.toml"))
}
