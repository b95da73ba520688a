//! Pipeline configuration.
//!
//! The config is consumed, never produced, by the core. It is usually read
//! from a JSON file; the historical `playerLength` / `minTicksToPrepare`
//! keys are accepted alongside the snake_case names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Team id whose players get a `1` team indicator.
pub const DEFAULT_TEAM_ONE: i32 = 1;

/// Read increment for corpus streams.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for corpus preparation and loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Players every retained frame must have (spectators excluded).
    #[serde(alias = "playerLength")]
    pub expected_player_count: usize,

    /// A match whose largest tick is below this is discarded.
    #[serde(default, alias = "minTicksToPrepare")]
    pub minimum_ticks_to_retain: u32,

    /// Team id marked as `1` in the feature vector's team slots.
    #[serde(default = "default_team_one")]
    pub team_one: i32,

    /// Bytes requested per read when streaming a corpus.
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,
}

fn default_team_one() -> i32 {
    DEFAULT_TEAM_ONE
}

fn default_read_chunk_size() -> usize {
    DEFAULT_READ_CHUNK_SIZE
}

impl CorpusConfig {
    /// Create a config for the given number of players per frame.
    pub fn new(expected_player_count: usize) -> Self {
        Self {
            expected_player_count,
            minimum_ticks_to_retain: 0,
            team_one: DEFAULT_TEAM_ONE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }

    /// Set the minimum largest-tick for a match to be kept.
    #[must_use]
    pub fn with_minimum_ticks(mut self, ticks: u32) -> Self {
        self.minimum_ticks_to_retain = ticks;
        self
    }

    /// Set the team id flagged in the feature vector.
    #[must_use]
    pub fn with_team_one(mut self, team: i32) -> Self {
        self.team_one = team;
        self
    }

    /// Set the corpus read increment.
    #[must_use]
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.expected_player_count == 0 {
            return Err(Error::InvalidConfig(
                "expected_player_count must be at least 1".into(),
            ));
        }
        if self.read_chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "read_chunk_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Length of every feature vector built from a retained frame.
    #[must_use]
    pub fn feature_len(&self) -> usize {
        crate::features::feature_len(self.expected_player_count)
    }
}
