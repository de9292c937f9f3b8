//! Configuration management for authgate.
//!
//! Loads configuration from ${AUTHGATE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for authgate configuration and data directories.
    //!
    //! AUTHGATE_HOME resolution order:
    //! 1. AUTHGATE_HOME environment variable (if set)
    //! 2. ~/.config/authgate (default)
    //! 3. ./.authgate when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the authgate home directory.
    pub fn authgate_home() -> PathBuf {
        if let Ok(home) = std::env::var("AUTHGATE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".authgate"),
            |h| h.join(".config").join("authgate"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        authgate_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        authgate_home().join("logs")
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Identity provider registration.
///
/// The local client carries `authority` and `redirect_uri` into its login
/// logs and failure reasons; a real provider would register with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Application (client) ID.
    pub client_id: String,
    /// Directory (tenant) authority URL.
    pub authority: String,
    /// Registered redirect URI.
    pub redirect_uri: String,
    /// Provider name for the sign-in button.
    pub display_name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            client_id: "00000000-0000-0000-0000-000000000000".to_string(),
            authority: "https://login.microsoftonline.com/common".to_string(),
            redirect_uri: "http://localhost:3000".to_string(),
            display_name: "Microsoft".to_string(),
        }
    }
}

/// In-process identity client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Usernames already cached at startup.
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Account produced by a simulated login. A `[local]` table without this
    /// key disables login; only a missing table falls back to the default.
    #[serde(default)]
    pub login_as: Option<String>,
    /// Simulated redirect round-trip in milliseconds.
    pub redirect_delay_ms: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            login_as: Some("user@contoso.com".to_string()),
            redirect_delay_ms: 400,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracing filter directive for the log file
    pub log_level: String,

    /// Identity provider registration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Local identity client settings
    #[serde(default)]
    pub local: LocalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            identity: IdentityConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Checks the identity registration values.
    ///
    /// # Errors
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.identity.client_id.trim().is_empty() {
            anyhow::bail!("identity.client_id must not be empty");
        }
        url::Url::parse(&self.identity.authority)
            .with_context(|| format!("Invalid identity.authority: {}", self.identity.authority))?;
        url::Url::parse(&self.identity.redirect_uri).with_context(|| {
            format!(
                "Invalid identity.redirect_uri: {}",
                self.identity.redirect_uri
            )
        })?;
        Ok(())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::providers::LocalOptions;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "[local]\naccounts = [\"alice@contoso.com\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.local.accounts, vec!["alice@contoso.com"]);
        assert_eq!(config.local.redirect_delay_ms, 400);
        assert_eq!(config.identity, IdentityConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "log_level = [").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_local_table_without_login_as_disables_login() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[local]\naccounts = []\nredirect_delay_ms = 400\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.local.login_as, None);

        let options = LocalOptions::from(&config);
        assert_eq!(options.login_as, None);
    }

    #[test]
    fn test_missing_local_table_keeps_default_login() {
        let config: Config = toml::from_str("log_level = \"debug\"\n").unwrap();
        assert_eq!(config.local.login_as.as_deref(), Some("user@contoso.com"));
    }

    #[test]
    fn test_template_matches_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("[identity]"));
        assert!(contents.contains("login_as ="));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "# existing").unwrap();

        let err = Config::init(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# existing");
    }

    #[test]
    fn test_validate_rejects_bad_authority() {
        let mut config = Config::default();
        config.validate().unwrap();

        config.identity.authority = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("identity.authority"));
    }

    #[test]
    fn test_validate_rejects_empty_client_id() {
        let mut config = Config::default();
        config.identity.client_id = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
