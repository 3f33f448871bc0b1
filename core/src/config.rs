//! TOML Configuration File Support
//!
//! Centralized configuration loading for PolicyBot, backed by an optional
//! TOML file at `~/.config/policybot/policybot.toml`.
//!
//! # Configuration Priority
//!
//! Values are applied in this order (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8080"
//! request_timeout_secs = 30
//!
//! [ui]
//! greeting = "Hello! I'm PolicyBot. How can I assist you today?"
//! theme = "dark"
//!
//! [delete]
//! policy = "record-and-index"
//!
//! [upload]
//! rollback_partial = true
//! ```
//!
//! # Environment Variables
//!
//! - `POLICYBOT_BASE_URL`: backend origin
//! - `POLICYBOT_REQUEST_TIMEOUT_SECS`: per-request timeout (0 = none)
//! - `POLICYBOT_DELETE_POLICY`: `record-only` or `record-and-index`
//! - `POLICYBOT_THEME`: `light` or `dark`

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::ServiceSettings;

/// Backend origin used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Greeting shown as the first chat message
pub const DEFAULT_GREETING: &str = "Hello! I'm PolicyBot. How can I assist you today?";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Enumerated Settings
// =============================================================================

/// What a confirmed delete removes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    /// Remove the record-store entry only
    #[default]
    RecordOnly,
    /// Remove the record-store entry, then the index entries for its filename
    RecordAndIndex,
}

impl FromStr for DeletePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "record-only" | "record" => Ok(Self::RecordOnly),
            "record-and-index" | "all" => Ok(Self::RecordAndIndex),
            other => Err(ConfigError::ValidationError(format!(
                "unknown delete policy '{other}' (expected record-only or record-and-index)"
            ))),
        }
    }
}

/// Color theme for surfaces that support one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background
    #[default]
    Light,
    /// Dark background
    Dark,
}

impl Theme {
    /// The other theme
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ConfigError::ValidationError(format!(
                "unknown theme '{other}' (expected light or dark)"
            ))),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Backend origin, e.g. `http://localhost:8080`
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (0 = no timeout)
    pub request_timeout_secs: Option<u64>,
}

/// UI section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// First chat message
    pub greeting: Option<String>,

    /// Starting theme
    pub theme: Option<Theme>,
}

/// Delete section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteToml {
    /// What a confirmed delete removes
    pub policy: Option<DeletePolicy>,
}

/// Upload section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadToml {
    /// Undo the index write when the record write fails
    pub rollback_partial: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyBotToml {
    /// Backend configuration section
    pub backend: BackendToml,

    /// UI configuration section
    pub ui: UiToml,

    /// Delete configuration section
    pub delete: DeleteToml,

    /// Upload configuration section
    pub upload: UploadToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Where and how to reach the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendSettings {
    /// Backend origin; every endpoint path is joined onto this
    pub base_url: String,
    /// Per-request timeout; `None` waits forever
    pub request_timeout: Option<Duration>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

/// Presentation settings shared by both surfaces
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiSettings {
    /// First chat message
    pub greeting: String,
    /// Starting theme
    pub theme: Theme,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            theme: Theme::default(),
        }
    }
}

/// Fully resolved PolicyBot configuration
///
/// Use [`load_config`] to build one with proper priority handling.
#[derive(Clone, Debug)]
pub struct PolicyBotConfig {
    /// Backend connection settings
    pub backend: BackendSettings,

    /// Presentation settings
    pub ui: UiSettings,

    /// What a confirmed delete removes
    pub delete_policy: DeletePolicy,

    /// Undo the index write when the record write fails
    pub rollback_partial_uploads: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for PolicyBotConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            ui: UiSettings::default(),
            delete_policy: DeletePolicy::default(),
            rollback_partial_uploads: false,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl PolicyBotConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Settings the document service needs
    #[must_use]
    pub fn service(&self) -> ServiceSettings {
        ServiceSettings {
            delete_policy: self.delete_policy,
            rollback_partial_uploads: self.rollback_partial_uploads,
        }
    }

    /// Check values that cannot be expressed in the types
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when the base URL is not an
    /// absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.backend.base_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "backend.base_url '{}' is not a valid URL: {e}",
                self.backend.base_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "backend.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/policybot/policybot.toml` or
/// `~/.config/policybot/policybot.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("policybot").join("policybot.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; apply [`ConfigOverrides`] afterwards.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<PolicyBotConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if an environment variable holds an invalid value.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PolicyBotConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<PolicyBotConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = PolicyBotConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: PolicyBotToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PolicyBotConfig, toml: &PolicyBotToml) {
    if let Some(ref url) = toml.backend.base_url {
        config.backend.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = toml.backend.request_timeout_secs {
        config.backend.request_timeout = timeout_from_secs(secs);
    }

    if let Some(ref greeting) = toml.ui.greeting {
        config.ui.greeting = greeting.clone();
    }
    if let Some(theme) = toml.ui.theme {
        config.ui.theme = theme;
    }

    if let Some(policy) = toml.delete.policy {
        config.delete_policy = policy;
    }

    if let Some(rollback) = toml.upload.rollback_partial {
        config.rollback_partial_uploads = rollback;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut PolicyBotConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("POLICYBOT_BASE_URL") {
        config.backend.base_url = url.trim_end_matches('/').to_string();
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("POLICYBOT_REQUEST_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.backend.request_timeout = timeout_from_secs(secs);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring non-numeric POLICYBOT_REQUEST_TIMEOUT_SECS");
        }
    }
    if let Some(policy) = env("POLICYBOT_DELETE_POLICY") {
        config.delete_policy = policy.parse()?;
        config.source = ConfigSource::Env;
    }
    if let Some(theme) = env("POLICYBOT_THEME") {
        config.ui.theme = theme.parse()?;
        config.source = ConfigSource::Env;
    }
    Ok(())
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Backend origin override
    pub base_url: Option<String>,

    /// Theme override
    pub theme: Option<Theme>,

    /// Delete policy override
    pub delete_policy: Option<DeletePolicy>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backend origin override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set theme override
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Set delete policy override
    #[must_use]
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = Some(policy);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the overridden base URL is invalid.
    pub fn apply(&self, config: &mut PolicyBotConfig) -> Result<(), ConfigError> {
        if self.base_url.is_some() || self.theme.is_some() || self.delete_policy.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(theme) = self.theme {
            config.ui.theme = theme;
        }
        if let Some(policy) = self.delete_policy {
            config.delete_policy = policy;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = PolicyBotConfig::default();

        assert_eq!(config.backend.base_url, "http://localhost:8080");
        assert!(config.backend.request_timeout.is_none());
        assert_eq!(config.ui.theme, Theme::Light);
        assert_eq!(config.delete_policy, DeletePolicy::RecordOnly);
        assert!(!config.rollback_partial_uploads);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("policybot/policybot.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[backend]
base_url = "https://bot.internal:9443/"
request_timeout_secs = 15

[ui]
greeting = "Hi there"
theme = "dark"

[delete]
policy = "record-and-index"

[upload]
rollback_partial = true
"#,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.backend.base_url, "https://bot.internal:9443");
        assert_eq!(config.backend.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.ui.greeting, "Hi there");
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.delete_policy, DeletePolicy::RecordAndIndex);
        assert!(config.rollback_partial_uploads);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let file = write_toml("[backend]\nrequest_timeout_secs = 0\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert!(config.backend.request_timeout.is_none());
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/policybot.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();

        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml("[backend\nbase_url = 3\n");

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let file = write_toml("[backend]\nbase_url = \"localhost:8080\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));

        let file = write_toml("[backend]\nbase_url = \"not a url\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml(
            r#"
[backend]
base_url = "http://file-host:8080"

[delete]
policy = "record-only"
"#,
        );

        let env: HashMap<&str, &str> = [
            ("POLICYBOT_BASE_URL", "http://env-host:9090"),
            ("POLICYBOT_DELETE_POLICY", "record-and-index"),
            ("POLICYBOT_THEME", "dark"),
            ("POLICYBOT_REQUEST_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.backend.base_url, "http://env-host:9090");
        assert_eq!(config.delete_policy, DeletePolicy::RecordAndIndex);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.backend.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_bad_policy_is_error() {
        let result = load_config_with_env(None, |k| {
            (k == "POLICYBOT_DELETE_POLICY").then(|| "everything".to_string())
        });
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = PolicyBotConfig::default();
        ConfigOverrides::new()
            .with_base_url("http://cli-host:1234/")
            .with_theme(Theme::Dark)
            .with_delete_policy(DeletePolicy::RecordAndIndex)
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.backend.base_url, "http://cli-host:1234");
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.delete_policy, DeletePolicy::RecordAndIndex);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = PolicyBotConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_theme_toggle_and_parse() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_service_settings() {
        let mut config = PolicyBotConfig::default();
        config.delete_policy = DeletePolicy::RecordAndIndex;
        config.rollback_partial_uploads = true;

        let settings = config.service();
        assert_eq!(settings.delete_policy, DeletePolicy::RecordAndIndex);
        assert!(settings.rollback_partial_uploads);
    }
}
