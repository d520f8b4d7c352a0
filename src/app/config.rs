//! Configuration types for engine creation.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::menace::{ReinforcementValues, store::DEFAULT_SHARDS};

/// Configuration for creating a [`MenaceEngine`](crate::menace::MenaceEngine).
///
/// # Examples
///
/// ```
/// use menace::app::EngineConfig;
/// use menace::menace::ReinforcementValues;
///
/// let config = EngineConfig::new()
///     .with_seed(42)
///     .with_initial_beads(4)
///     .with_reinforcement(ReinforcementValues { win: 3, draw: 1, loss: 1, min_beads: 1 });
/// config.validate()?;
/// # Ok::<(), menace::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Beads placed on every empty cell of a new matchbox
    pub initial_beads: u32,
    /// Reward and penalty amounts
    pub reinforcement: ReinforcementValues,
    /// Base seed for per-session randomness (None = OS entropy)
    pub seed: Option<u64>,
    /// Lock stripes in the matchbox store
    pub shards: usize,
}

impl EngineConfig {
    /// Defaults: 3 initial beads, +3/+1/-1 reinforcement with a floor of 1,
    /// no seed and 16 store shards.
    pub fn new() -> Self {
        Self {
            initial_beads: 3,
            reinforcement: ReinforcementValues::default(),
            seed: None,
            shards: DEFAULT_SHARDS,
        }
    }

    pub fn with_initial_beads(mut self, beads: u32) -> Self {
        self.initial_beads = beads;
        self
    }

    pub fn with_reinforcement(mut self, values: ReinforcementValues) -> Self {
        self.reinforcement = values;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Check the bead parameters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] when `min_beads` is zero,
    /// `initial_beads` is below `min_beads`, or `shards` is zero.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |message: String| crate::Error::InvalidConfiguration { message };

        if self.reinforcement.min_beads == 0 {
            return Err(invalid("min_beads must be at least 1".to_string()));
        }
        if self.initial_beads < self.reinforcement.min_beads {
            return Err(invalid(format!(
                "initial_beads ({}) must be at least min_beads ({})",
                self.initial_beads, self.reinforcement.min_beads
            )));
        }
        if self.shards == 0 {
            return Err(invalid("shards must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| crate::Error::Io {
            operation: format!("read config {path:?}"),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
