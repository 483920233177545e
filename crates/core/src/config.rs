//! Configuration management
//!
//! Handles loading and saving `config.toml`. The file lives in
//! `$S3P_CONFIG_DIR`, falling back to the platform config directory.
//! A missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Environment variable that overrides the config directory
pub const CONFIG_DIR_ENV: &str = "S3P_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Invocation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Time zone the reference instant is read in
    pub timezone: String,

    /// Actions executed concurrently
    pub parallel: usize,

    /// Key suffixes skipped by cp/mv on prefixes
    pub excludes: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            parallel: crate::execute::DEFAULT_CONCURRENCY,
            excludes: Vec::new(),
        }
    }
}

/// Canned ACL applied to copied and written objects unless configured otherwise
pub const DEFAULT_ACL: &str = "bucket-owner-full-control";

/// Store connection settings
///
/// Unset fields fall through to the AWS default provider chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Named profile from the shared AWS config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    pub force_path_style: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Canned ACL for copy and put requests; empty sends none
    pub acl: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            profile: None,
            force_path_style: false,
            access_key: None,
            secret_key: None,
            acl: DEFAULT_ACL.to_string(),
        }
    }
}

impl StoreConfig {
    /// Static credentials, if both halves are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(a), Some(s)) => Some((a.as_str(), s.as_str())),
            _ => None,
        }
    }
}

/// Retry configuration for store requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
    pub store: StoreConfig,
    pub retry: RetryConfig,
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.defaults.parallel == 0 {
            return Err(Error::Config("defaults.parallel must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.store.access_key.is_some() != self.store.secret_key.is_some() {
            return Err(Error::Config(
                "store.access_key and store.secret_key must be set together".into(),
            ));
        }
        Ok(())
    }
}

/// Manages loading and saving configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the default location
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: Self::default_config_dir()?.join(CONFIG_FILE),
        })
    }

    /// Create a manager for an explicit file (used in tests)
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    fn default_config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
            && !dir.is_empty()
        {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|d| d.join("s3p"))
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration; a missing file yields defaults
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration, creating parent directories
    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(dir.path().join("config.toml"))
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = manager(&dir).load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.defaults.timezone, "UTC");
        assert_eq!(config.defaults.parallel, 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);

        let mut config = Config::default();
        config.defaults.excludes = vec!["_SUCCESS".to_string()];
        config.store.region = Some("us-west-2".to_string());
        config.store.endpoint = Some("http://localhost:9000".to_string());
        config.retry.max_attempts = 5;

        mgr.save(&config).unwrap();
        assert_eq!(mgr.load().unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);
        std::fs::write(
            mgr.config_path(),
            "[defaults]\ntimezone = \"Europe/Berlin\"\n\n[store]\nprofile = \"etl\"\n",
        )
        .unwrap();

        let config = mgr.load().unwrap();
        assert_eq!(config.defaults.timezone, "Europe/Berlin");
        assert_eq!(config.defaults.parallel, 4);
        assert_eq!(config.store.profile.as_deref(), Some("etl"));
        assert_eq!(config.store.acl, DEFAULT_ACL);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);

        std::fs::write(mgr.config_path(), "[defaults]\nparallel = 0\n").unwrap();
        assert!(matches!(mgr.load(), Err(Error::Config(_))));

        std::fs::write(mgr.config_path(), "[store]\naccess_key = \"AK\"\n").unwrap();
        assert!(matches!(mgr.load(), Err(Error::Config(_))));

        std::fs::write(mgr.config_path(), "[defaults\n").unwrap();
        assert!(matches!(mgr.load(), Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_acl_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let mgr = manager(&dir);
        std::fs::write(mgr.config_path(), "[store]\nacl = \"\"\n").unwrap();
        assert_eq!(mgr.load().unwrap().store.acl, "");
    }

    #[test]
    fn test_static_credentials() {
        let store = StoreConfig {
            access_key: Some("AK".into()),
            secret_key: Some("SK".into()),
            ..Default::default()
        };
        assert_eq!(store.static_credentials(), Some(("AK", "SK")));
        assert_eq!(StoreConfig::default().static_credentials(), None);
    }
}
