//! Configuration management for Metro.
//!
//! Parses `metro.toml` with serde and discovers it in the current directory
//! or any parent. CLI flags are layered on top through [`CliSettings`].
//!
//! ```toml
//! [confluence]
//! base_url = "https://wiki.example.com"
//! username = "docs-bot"
//! password = "${CONFLUENCE_PASSWORD}"
//!
//! [publish]
//! default_parent_id = 123456
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` (error if unset) and `${VAR:-default}` are expanded in
//! `confluence.base_url`, `confluence.username` and `confluence.password`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "metro.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Parent for created pages that name none.
    pub parent_id: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection (optional section, required for publishing).
    pub confluence: Option<ConfluenceConfig>,
    /// Publishing defaults.
    pub publish: PublishConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection settings.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Server base URL, e.g. `https://wiki.example.com`.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConfluenceConfig {
    /// Validate that the connection settings are usable.
    ///
    /// The password may be empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a field is empty or malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.username, "confluence.username")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Publishing defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Parent page for `create` entries without `parent_id`.
    pub default_parent_id: Option<u64>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.password`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_PASSWORD`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `metro.toml` in the current directory and its parents, falling
    /// back to defaults when none exists. CLI settings are applied last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or an environment variable reference cannot be expanded.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// Connection overrides create the `[confluence]` section if the file had none.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let overrides_connection = settings.base_url.is_some()
            || settings.username.is_some()
            || settings.password.is_some();
        if overrides_connection {
            let confluence = self.confluence.get_or_insert_with(ConfluenceConfig::default);
            if let Some(base_url) = &settings.base_url {
                confluence.base_url.clone_from(base_url);
            }
            if let Some(username) = &settings.username {
                confluence.username.clone_from(username);
            }
            if let Some(password) = &settings.password {
                confluence.password.clone_from(password);
            }
        }
        if let Some(parent_id) = settings.parent_id {
            self.publish.default_parent_id = Some(parent_id);
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.username = expand::expand_env(&confluence.username, "confluence.username")?;
            confluence.password = expand::expand_env(&confluence.password, "confluence.password")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid_confluence_config() -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://wiki.example.com".to_owned(),
            username: "docs-bot".to_owned(),
            password: "secret".to_owned(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.confluence.is_none());
        assert!(config.publish.default_parent_id.is_none());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[confluence]
base_url = "https://wiki.example.com"
username = "docs-bot"
password = "secret"
timeout_secs = 10

[publish]
default_parent_id = 4242
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://wiki.example.com");
        assert_eq!(confluence.username, "docs-bot");
        assert_eq!(confluence.password, "secret");
        assert_eq!(confluence.timeout_secs, 10);
        assert_eq!(config.publish.default_parent_id, Some(4242));
    }

    #[test]
    fn test_timeout_defaults_to_30() {
        let toml = r#"
[confluence]
base_url = "https://wiki.example.com"
username = "docs-bot"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.timeout_secs, 30);
        assert_eq!(confluence.password, "");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metro.toml");
        std::fs::write(&path, "[publish]\ndefault_parent_id = 7\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.publish.default_parent_id, Some(7));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metro.toml");
        std::fs::write(&path, "[confluence\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_apply_cli_settings_creates_confluence_section() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            base_url: Some("https://wiki.example.com".to_owned()),
            username: Some("me".to_owned()),
            ..Default::default()
        });
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://wiki.example.com");
        assert_eq!(confluence.username, "me");
        assert_eq!(confluence.timeout_secs, 30);
    }

    #[test]
    fn test_apply_cli_settings_overrides_file_values() {
        let mut config = Config {
            confluence: Some(valid_confluence_config()),
            ..Default::default()
        };
        config.apply_cli_settings(&CliSettings {
            password: Some("override".to_owned()),
            parent_id: Some(99),
            ..Default::default()
        });
        let confluence = config.confluence.as_ref().unwrap();
        assert_eq!(confluence.password, "override");
        assert_eq!(confluence.username, "docs-bot");
        assert_eq!(config.publish.default_parent_id, Some(99));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert!(config.confluence.is_none());
        assert!(config.publish.default_parent_id.is_none());
    }

    #[test]
    fn test_expand_env_vars_confluence() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("METRO_TEST_URL", "https://wiki.test.com");
            std::env::set_var("METRO_TEST_PASSWORD", "hunter2");
        }

        let toml = r#"
[confluence]
base_url = "${METRO_TEST_URL}"
username = "${METRO_TEST_USER:-bot}"
password = "${METRO_TEST_PASSWORD}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://wiki.test.com");
        assert_eq!(confluence.username, "bot");
        assert_eq!(confluence.password, "hunter2");

        unsafe {
            std::env::remove_var("METRO_TEST_URL");
            std::env::remove_var("METRO_TEST_PASSWORD");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("METRO_TEST_MISSING");
        }
        let toml = r#"
[confluence]
base_url = "https://wiki.example.com"
username = "bot"
password = "${METRO_TEST_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("confluence.password"));
    }

    #[test]
    fn test_confluence_config_validate_valid() {
        assert!(valid_confluence_config().validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_empty_username() {
        let config = ConfluenceConfig {
            username: String::new(),
            ..valid_confluence_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confluence.username"));
    }

    #[test]
    fn test_confluence_config_validate_invalid_url() {
        let config = ConfluenceConfig {
            base_url: "wiki.example.com".to_owned(),
            ..valid_confluence_config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_confluence_config_validate_zero_timeout() {
        let config = ConfluenceConfig {
            timeout_secs: 0,
            ..valid_confluence_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_confluence_missing_section() {
        let err = Config::default().require_confluence().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[confluence]"));
    }

    #[test]
    fn test_require_confluence_returns_validated() {
        let config = Config {
            confluence: Some(valid_confluence_config()),
            ..Default::default()
        };
        assert_eq!(
            config.require_confluence().unwrap().base_url,
            "https://wiki.example.com"
        );
    }
}
