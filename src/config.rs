//! Quiz configuration
//!
//! Read from `config.toml` in the OS config directory. Every field has a
//! default, so a missing file or a partial file is fine.

use crate::game::session::{DEFAULT_DAILY_QUESTIONS, DEFAULT_QUESTIONS_PER_PLAYER, MAX_QUESTIONS};
use crate::words::{DifficultyLevel, MAX_LEVEL, MIN_LEVEL};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level quiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Questions each player answers in a regular game
    pub questions_per_player: usize,
    /// Questions in the daily challenge
    pub daily_questions: usize,
    /// How long failure statistics are reused before refetching
    pub failure_stats_ttl_secs: u64,
    /// Level preselected on the setup screen (1-4)
    pub default_level: u8,
    /// Upper bound for hot-seat players
    pub max_players: usize,
    /// Database location; the OS data directory when unset
    pub database_path: Option<PathBuf>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_per_player: DEFAULT_QUESTIONS_PER_PLAYER,
            daily_questions: DEFAULT_DAILY_QUESTIONS,
            failure_stats_ttl_secs: 30,
            default_level: MIN_LEVEL,
            max_players: 10,
            database_path: None,
        }
    }
}

impl QuizConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sinonimoak").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse TOML text and validate it
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: QuizConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the game cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_QUESTIONS).contains(&self.questions_per_player) {
            return Err(ConfigError::Invalid(format!(
                "questions_per_player must be between 1 and {}",
                MAX_QUESTIONS
            )));
        }
        if !(1..=MAX_QUESTIONS).contains(&self.daily_questions) {
            return Err(ConfigError::Invalid(format!(
                "daily_questions must be between 1 and {}",
                MAX_QUESTIONS
            )));
        }
        if self.max_players == 0 {
            return Err(ConfigError::Invalid("max_players must be > 0".into()));
        }
        if DifficultyLevel::new(self.default_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "default_level must be between {} and {}",
                MIN_LEVEL, MAX_LEVEL
            )));
        }
        Ok(())
    }

    pub fn default_level(&self) -> DifficultyLevel {
        DifficultyLevel::new(self.default_level).unwrap_or_default()
    }

    pub fn failure_stats_ttl(&self) -> Duration {
        Duration::from_secs(self.failure_stats_ttl_secs)
    }
}
