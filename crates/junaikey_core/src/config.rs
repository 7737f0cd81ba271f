//! Application configuration.
//!
//! # Responsibility
//! - Load `AppConfig` from TOML with per-section defaults.
//! - Apply `JUNAIKEY_*` environment overrides.
//! - Reject settings the runtime cannot honor.
//!
//! # Invariants
//! - A missing config file yields defaults, never an error.
//! - `latency_min_ms <= latency_max_ms`; timeouts and reset delays are > 0.

use crate::sync::{LatencyProfile, SyncSettings};
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = ".junaikey";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; `~/` is expanded.
    pub db_path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling log files; `~/` is expanded.
    pub log_dir: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub auto_reset_ms: u64,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub seed_examples: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: format!("~/{APP_DIR_NAME}/junaikey.sqlite3"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: format!("~/{APP_DIR_NAME}/logs"),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_reset_ms: 3_000,
            timeout_ms: 30_000,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: 500,
            latency_max_ms: 1_500,
            seed_examples: true,
        }
    }
}

/// Config load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Returns `~/.junaikey/`, or a relative `.junaikey` without a home dir.
pub fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME))
}

/// Returns `~/.junaikey/config.toml`.
pub fn default_config_path() -> PathBuf {
    default_app_dir().join("config.toml")
}

impl AppConfig {
    /// Loads the default config file, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(default_config_path())
    }

    /// Loads `path` if it exists, applies env overrides, validates.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            info!(
                "event=config_load module=config status=skip reason=missing path={}",
                path.display()
            );
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// `JUNAIKEY_DB`, `JUNAIKEY_LOG_LEVEL`, `JUNAIKEY_LOG_DIR`.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("JUNAIKEY_DB") {
            self.storage.db_path = value;
        }
        if let Ok(value) = std::env::var("JUNAIKEY_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Ok(value) = std::env::var("JUNAIKEY_LOG_DIR") {
            self.logging.log_dir = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.latency_min_ms > self.remote.latency_max_ms {
            return Err(ConfigError::Invalid(format!(
                "remote.latency_min_ms ({}) exceeds remote.latency_max_ms ({})",
                self.remote.latency_min_ms, self.remote.latency_max_ms
            )));
        }
        if self.sync.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "sync.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.sync.auto_reset_ms == 0 {
            return Err(ConfigError::Invalid(
                "sync.auto_reset_ms must be greater than zero".to_string(),
            ));
        }
        if self.storage.db_path.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.db_path is empty".to_string()));
        }
        Ok(())
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        expand_tilde(&self.logging.log_dir)
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            auto_reset: Duration::from_millis(self.sync.auto_reset_ms),
            timeout: Duration::from_millis(self.sync.timeout_ms),
        }
    }

    pub fn latency_profile(&self) -> LatencyProfile {
        LatencyProfile::from_millis(self.remote.latency_min_ms, self.remote.latency_max_ms)
    }
}

/// Expands a leading `~/` to the home directory when one is known.
pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::time::Duration;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [sync]
            auto_reset_ms = 100

            [remote]
            seed_examples = false
            "#,
        )
        .expect("parse");

        assert_eq!(config.sync.auto_reset_ms, 100);
        assert_eq!(config.sync.timeout_ms, 30_000);
        assert!(!config.remote.seed_examples);
        assert_eq!(config.remote.latency_min_ms, 500);
        assert_eq!(config.sync_settings().auto_reset, Duration::from_millis(100));
    }

    #[test]
    fn validate_rejects_inverted_latency_range() {
        let mut config = AppConfig::default();
        config.remote.latency_min_ms = 2_000;
        let err = config.validate().expect_err("inverted range must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.sync.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load_from(dir.path().join("absent.toml")).expect("load");
        assert_eq!(config.remote, AppConfig::default().remote);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sync\nauto_reset_ms = ").expect("write");
        let err = AppConfig::load_from(&path).expect_err("malformed toml must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
