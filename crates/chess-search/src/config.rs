//! Search configuration.
//!
//! Settings are plain data loaded from TOML. Every field has a default, so a
//! file only needs to name what it changes:
//!
//! ```toml
//! time_limit_ms = 5000
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading a search configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// The file is not valid TOML for [`SearchConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Preset strength tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Fixed depth of two plies past the root reply.
    Easy,
    /// Three seconds per move.
    #[default]
    Medium,
    /// Twelve seconds per move.
    Hard,
}

/// Budget and pacing for the computer player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Deepest iteration to run. 0 means no depth limit.
    #[serde(default)]
    pub depth_limit: u32,
    /// Wall-clock budget per search in milliseconds. 0 means no timer.
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,
    /// Pause before playing a book move.
    #[serde(default = "default_book_delay_ms")]
    pub book_delay_ms: u64,
    /// Pause before the very first move of a game.
    #[serde(default = "default_first_move_delay_ms")]
    pub first_move_delay_ms: u64,
    /// The first iteration slower than this becomes the depth from which
    /// root candidates are reported as considered.
    #[serde(default = "default_consider_threshold_ms")]
    pub consider_threshold_ms: u64,
    /// Iteration ceiling used when `depth_limit` is 0.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Seed for book choices. Entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_time_limit_ms() -> u64 {
    3000
}

fn default_book_delay_ms() -> u64 {
    200
}

fn default_first_move_delay_ms() -> u64 {
    400
}

fn default_consider_threshold_ms() -> u64 {
    300
}

fn default_max_depth() -> u32 {
    32
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth_limit: 0,
            time_limit_ms: default_time_limit_ms(),
            book_delay_ms: default_book_delay_ms(),
            first_move_delay_ms: default_first_move_delay_ms(),
            consider_threshold_ms: default_consider_threshold_ms(),
            max_depth: default_max_depth(),
            seed: None,
        }
    }
}

impl SearchConfig {
    /// The preset for a difficulty tier, other settings at their defaults.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (depth_limit, time_limit_ms) = match difficulty {
            Difficulty::Easy => (2, 0),
            Difficulty::Medium => (0, 3000),
            Difficulty::Hard => (0, 12000),
        };
        SearchConfig {
            depth_limit,
            time_limit_ms,
            ..SearchConfig::default()
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The last iteration depth the engine may run.
    pub fn depth_ceiling(&self) -> u32 {
        if self.depth_limit > 0 {
            self.depth_limit.min(self.max_depth)
        } else {
            self.max_depth
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    pub fn book_delay(&self) -> Duration {
        Duration::from_millis(self.book_delay_ms)
    }

    pub fn first_move_delay(&self) -> Duration {
        Duration::from_millis(self.first_move_delay_ms)
    }

    pub fn consider_threshold(&self) -> Duration {
        Duration::from_millis(self.consider_threshold_ms)
    }
}

impl From<Difficulty> for SearchConfig {
    fn from(difficulty: Difficulty) -> Self {
        SearchConfig::for_difficulty(difficulty)
    }
}
