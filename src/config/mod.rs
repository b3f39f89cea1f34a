//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::calculate::GamesRule;
use crate::chat::DEFAULT_CONTEXT;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Chat backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the remote chat backend; local answers only when unset
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_chat_timeout")]
    pub timeout_seconds: u64,

    /// Context tag sent with questions that do not name one
    #[serde(default = "default_chat_context")]
    pub context: String,

    /// Display names for league ids, used in local answers
    #[serde(default)]
    pub league_names: HashMap<String, String>,
}

fn default_chat_timeout() -> u64 {
    10
}

fn default_chat_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            timeout_seconds: default_chat_timeout(),
            context: default_chat_context(),
            league_names: HashMap::new(),
        }
    }
}

/// Name reconciliation thresholds. Empirically tuned, so kept adjustable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_max_length_diff")]
    pub max_length_diff: usize,

    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_max_mismatches")]
    pub max_mismatches: usize,

    /// Jaro-Winkler acceptance threshold
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_max_length_diff() -> usize {
    2
}

fn default_min_length() -> usize {
    5
}

fn default_max_mismatches() -> usize {
    2
}

fn default_similarity_threshold() -> f64 {
    0.85
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_length_diff: default_max_length_diff(),
            min_length: default_min_length(),
            max_mismatches: default_max_mismatches(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    #[serde(default)]
    pub games_rule: GamesRule,

    /// Entries per leaderboard
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,

    /// Merge player rows whose names reconcile
    #[serde(default = "default_reconcile_names")]
    pub reconcile_names: bool,
}

fn default_leaderboard_size() -> usize {
    5
}

fn default_reconcile_names() -> bool {
    true
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            games_rule: GamesRule::default(),
            leaderboard_size: default_leaderboard_size(),
            reconcile_names: default_reconcile_names(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            chat: ChatConfig::default(),
            matching: MatchingConfig::default(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            warn!("Config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Chat timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = &self.chat.backend_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "Chat backend URL must be http(s): {}",
                    url
                )));
            }
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let threshold = self.matching.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "Similarity threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        if self.aggregation.leaderboard_size == 0 {
            return Err(ConfigError::ValidationError(
                "Leaderboard size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 8080);
        assert!(config.chat.backend_url.is_none());
        assert_eq!(config.aggregation.games_rule, GamesRule::ExcludeZeroMinutes);
    }

    #[test]
    fn test_chat_config_default() {
        let chat = ChatConfig::default();

        assert_eq!(chat.timeout_seconds, 10);
        assert_eq!(chat.context, "coaching_chatbot");
        assert!(chat.league_names.is_empty());
    }

    #[test]
    fn test_chat_config_from_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [chat]
            context = "scouting"

            [chat.league_names]
            nbl = "National Basketball League"
            "#,
        )
        .unwrap();

        assert_eq!(config.chat.context, "scouting");
        assert_eq!(
            config.chat.league_names.get("nbl").map(String::as_str),
            Some("National Basketball League")
        );
    }

    #[test]
    fn test_matching_config_default() {
        let m = MatchingConfig::default();

        assert_eq!(m.max_length_diff, 2);
        assert_eq!(m.min_length, 5);
        assert_eq!(m.max_mismatches, 2);
        assert_eq!(m.similarity_threshold, 0.85);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.chat.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_threshold() {
        let mut config = AppConfig::default();
        config.matching.similarity_threshold = 1.5;
        assert!(config.validate().is_err());

        config.matching.similarity_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_backend_url() {
        let mut config = AppConfig::default();
        config.chat.backend_url = Some("localhost:8000".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            data_dir = "/srv/league"

            [chat]
            backend_url = "http://localhost:8000"

            [aggregation]
            games_rule = "every_row"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/league"));
        assert_eq!(config.chat.timeout_seconds, 10);
        assert_eq!(config.aggregation.games_rule, GamesRule::EveryRow);
        assert_eq!(config.aggregation.leaderboard_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9090\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9090);

        std::fs::write(&path, "[server]\nport = 0\n").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
    }
}
