//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/sentinel/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/sentinel/` (~/.config/sentinel/)
//! - State/Logs: `$XDG_STATE_HOME/sentinel/` (~/.local/state/sentinel/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Generative AI backend configuration
    #[serde(default)]
    pub genai: GenAiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generative AI backend configuration
///
/// The backend is a Gemini-style `streamGenerateContent` SSE endpoint. The
/// API key can come from the config file or from the `GEMINI_API_KEY`
/// environment variable; the env var wins when both are set.
#[derive(Debug, Deserialize, Clone)]
pub struct GenAiConfig {
    /// API endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (can also use GEMINI_API_KEY env var)
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds; streams can run for minutes
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl GenAiConfig {
    /// Resolve the API key from the environment or the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.resolve_api_key().is_none() {
            return Err(Error::Config(
                "no API key: set genai.api_key in config.toml or the GEMINI_API_KEY env var"
                    .to_string(),
            ));
        }
        if self.endpoint.is_empty() {
            return Err(Error::Config("genai.endpoint must not be empty".to_string()));
        }
        if self.model.is_empty() {
            return Err(Error::Config("genai.model must not be empty".to_string()));
        }
        Ok(())
    }
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout() -> u64 {
    300
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/sentinel/config.toml` (~/.config/sentinel/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("sentinel").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/sentinel/` (~/.local/state/sentinel/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("sentinel")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/sentinel/sentinel.log` (~/.local/state/sentinel/sentinel.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("sentinel.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.genai.model, "gemini-2.5-flash");
        assert_eq!(config.genai.timeout_secs, 300);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[genai]
model = "gemini-2.5-pro"
api_key = "test-key"
timeout_secs = 60

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.genai.model, "gemini-2.5-pro");
        assert_eq!(config.genai.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.genai.timeout_secs, 60);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[genai]\nmodel = \"gemini-2.5-pro\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.genai.model, "gemini-2.5-pro");
        // Unspecified sections fall back to defaults
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = GenAiConfig {
            api_key: None,
            ..Default::default()
        };
        // Only meaningful when GEMINI_API_KEY is not set in the test env
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(config.validate().is_err());
        }

        let config = GenAiConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
