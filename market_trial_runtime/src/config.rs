//! Runtime configuration.
//!
//! Loaded from an optional JSON file. A missing file means defaults; a
//! present but malformed file is an error.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use market_trial_engine::content::ContentCatalog;
use market_trial_engine::random::{RandomSource, SeededRandom, ThreadRandom};
use market_trial_engine::rules::GameRules;

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IoError: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "ParseError: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Directory backing the file store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Fixed RNG seed. `None` draws from thread entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: GameRules,
    /// JSON content catalog replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_path: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("market_trial_data")
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            seed: None,
            rules: GameRules::default(),
            content_path: None,
        }
    }
}

impl RuntimeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// The configured content, or the built-in catalog.
    pub fn load_catalog(&self) -> Result<ContentCatalog, ConfigError> {
        match &self.content_path {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                serde_json::from_str(&text).map_err(|e| ConfigError::ParseError(e.to_string()))
            }
            None => Ok(ContentCatalog::builtin()),
        }
    }

    pub fn random_source(&self) -> Box<dyn RandomSource + Send> {
        match self.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadRandom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir()
            .join("market_trial_config_tests")
            .join("does_not_exist.json");
        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = RuntimeConfig::from_json(r#"{"seed":42}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.rules, GameRules::default());
        assert_eq!(config.data_dir, PathBuf::from("market_trial_data"));
    }

    #[test]
    fn rules_can_be_overridden() {
        let config = RuntimeConfig::from_json(
            r#"{"rules":{"totalRounds":3,"eventChance":0.0,"shieldRounds":1,
                "timeBonusSeconds":10,"mentorAdviceFrequency":3}}"#,
        )
        .unwrap();
        assert_eq!(config.rules.total_rounds, 3);
        assert_eq!(config.rules.event_chance, 0.0);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = std::env::temp_dir().join("market_trial_config_tests").join("malformed");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, b"{ seed: nope").unwrap();
        match RuntimeConfig::load(&path).unwrap_err() {
            ConfigError::ParseError(_) => {}
            other => panic!("Expected ParseError, got: {:?}", other),
        }
    }

    #[test]
    fn seeded_sources_repeat() {
        let config = RuntimeConfig {
            seed: Some(5),
            ..RuntimeConfig::default()
        };
        let mut a = config.random_source();
        let mut b = config.random_source();
        assert_eq!(a.next_f64(), b.next_f64());
    }

    #[test]
    fn content_file_replaces_builtin_catalog() {
        let dir = std::env::temp_dir().join("market_trial_config_tests").join("content");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let mut catalog = ContentCatalog::builtin();
        catalog.events.truncate(2);
        let path = dir.join("content.json");
        fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

        let config = RuntimeConfig {
            content_path: Some(path),
            ..RuntimeConfig::default()
        };
        assert_eq!(config.load_catalog().unwrap(), catalog);
    }

    #[test]
    fn out_of_range_content_still_starts_a_game() {
        use crate::service::GameService;
        use crate::storage::MemoryStore;
        use market_trial_engine::domain::{Difficulty, Role};
        use market_trial_engine::engine::GameEngine;
        use market_trial_engine::random::SeededRandom;

        let dir = std::env::temp_dir().join("market_trial_config_tests").join("out_of_range");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let mut value = serde_json::to_value(ContentCatalog::builtin()).unwrap();
        value["roles"][0]["initialMetrics"]["revenue"] = serde_json::json!(150);
        let path = dir.join("content.json");
        fs::write(&path, value.to_string()).unwrap();

        let config = RuntimeConfig {
            content_path: Some(path),
            ..RuntimeConfig::default()
        };
        let catalog = config.load_catalog().unwrap();
        let role = catalog.roles[0].id;
        assert_eq!(catalog.roles[0].initial_metrics.revenue, 150.0);

        let mut service =
            GameService::new(GameEngine::new(catalog), MemoryStore::new(), SeededRandom::new(1));
        let state = service.start_game(role, Difficulty::Normal, None).unwrap();
        assert_eq!(state.metrics.revenue, 100.0);
    }
}
