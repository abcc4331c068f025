//! Application configuration management.
//!
//! Settings are merged from several layers, each overriding the previous one:
//!
//! 1. Built-in defaults
//! 2. A TOML file: the path given with `--config`, otherwise
//!    `config.toml` in the platform config directory when it exists
//! 3. `CLIENT_ID` / `TENANT_ID` environment variables
//! 4. `DRIVEDUPE_`-prefixed environment variables (`__` separates nested
//!    keys, e.g. `DRIVEDUPE_RETRY__MAX_ATTEMPTS=3`)
//! 5. Command-line flags ([`Config::apply_cli`])
//!
//! A `.env` file in the working directory is loaded into the environment by
//! the binary before the layers are read.
//!
//! ```toml
//! client_id = "00000000-0000-0000-0000-000000000000"
//! tenant_id = "consumers"
//! root_folder = "root"
//!
//! [retry]
//! max_attempts = 5
//! base_delay_ms = 1000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::device_code::authority_url;
use crate::cli::DriveArgs;
use crate::drive::graph::GRAPH_URL;
use crate::drive::{FolderRef, RetryPolicy};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DRIVEDUPE_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Retry settings for drive requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total calls per request, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for a single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application (client) id of the Azure app registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Directory tenant; `common` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Pre-issued access token. Skips the device-code login when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Delegated permissions requested at login.
    pub scopes: Vec<String>,
    /// Microsoft Graph endpoint.
    pub graph_url: String,
    /// Folder id the traversal starts from.
    pub root_folder: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Retry settings.
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            tenant_id: None,
            access_token: None,
            scopes: vec!["Files.ReadWrite.All".to_string(), "offline_access".to_string()],
            graph_url: GRAPH_URL.to_string(),
            root_folder: FolderRef::root().0,
            request_timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from all layers except the CLI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file,
    /// and [`ConfigError::Invalid`] if any layer fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(explicit)?
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Build the layered provider without extracting it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading configuration from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment
            .merge(Env::raw().only(&["CLIENT_ID", "TENANT_ID"]))
            .merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Platform-specific location of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "drivedupe", "drivedupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, args: &DriveArgs) {
        if let Some(root) = &args.root {
            self.root_folder = root.clone();
        }
        if let Some(max_attempts) = args.max_attempts {
            self.retry.max_attempts = max_attempts;
        }
    }

    /// Retry policy for drive requests. At least one attempt is always made.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts.max(1),
            Duration::from_millis(self.retry.base_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
        )
    }

    /// Identity platform authority for the configured tenant.
    #[must_use]
    pub fn authority(&self) -> String {
        authority_url(self.tenant_id.as_deref())
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Folder the traversal starts from.
    #[must_use]
    pub fn root(&self) -> FolderRef {
        FolderRef::new(self.root_folder.clone())
    }
}
