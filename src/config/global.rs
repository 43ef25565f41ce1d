//! Launcher configuration: an optional TOML file overridden by environment variables.

use crate::constants::{
    ARTIFACT_OVERRIDES_ENV, CONFIG_PATH_ENV, DEFAULT_FETCH_TIMEOUT, FETCH_TIMEOUT_ENV,
    GITHUB_TOKEN_ENV, LAUNCHER_API_BASE_URL,
};
use crate::core::LauncherError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Settings shared by every launcher command.
///
/// ```toml
/// fetch_timeout_secs = 30
/// artifact_overrides = ["/etc/pants/mirror.json"]
///
/// [update]
/// api_base_url = "https://github.example.com/api/v3/repos/pantsbuild/pants-launcher"
/// ```
///
/// Environment variables always win over the file, see [`LauncherConfig::apply_env`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Timeout for a single fetch, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// JSON documents mapping artifact names to URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifact_overrides: Vec<PathBuf>,

    /// Bearer token for GitHub API requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_api_bearer_token: Option<String>,

    /// Self-update settings.
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Where the launcher looks for its own releases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateConfig {
    /// GitHub API base of the launcher repository.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_api_base_url() -> String {
    LAUNCHER_API_BASE_URL.to_string()
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            artifact_overrides: Vec::new(),
            github_api_bearer_token: None,
            update: UpdateConfig::default(),
        }
    }
}

impl LauncherConfig {
    /// Load the config file (if any) and apply the process environment.
    ///
    /// # Errors
    ///
    /// Fails if the config file exists but cannot be parsed, or an environment override
    /// is malformed.
    pub async fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_path(),
        };

        let config = match path {
            Some(path) if path.exists() => Self::load_from(&path).await?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())
    }

    /// Load and parse a config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading launcher config from {}", path.display());
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read launcher config from {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            LauncherError::ConfigError {
                message: format!("{}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Default config file location: `<config dir>/pants-launcher/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pants-launcher").join("config.toml"))
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] for a timeout that is not a positive integer.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(FETCH_TIMEOUT_ENV) {
            self.fetch_timeout_secs = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(LauncherError::ConfigError {
                        message: format!(
                            "{FETCH_TIMEOUT_ENV} must be a positive number of seconds, given: {raw}"
                        ),
                    }
                    .into());
                }
            };
        }

        if let Some(raw) = lookup(ARTIFACT_OVERRIDES_ENV) {
            self.artifact_overrides =
                std::env::split_paths(&raw).filter(|p| !p.as_os_str().is_empty()).collect();
        }

        if let Some(token) = lookup(GITHUB_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.github_api_bearer_token = Some(token);
        }

        Ok(self)
    }

    /// Fetch timeout as a [`Duration`].
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
