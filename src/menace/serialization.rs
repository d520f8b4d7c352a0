//! Snapshot format for exporting and importing learned state
//!
//! A snapshot is a flat record: reward parameters, aggregate counters, the
//! progress history and every matchbox keyed by its canonical board text. It is
//! the unit handed to a [`SnapshotRepository`](crate::ports::SnapshotRepository).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{learning::ReinforcementValues, matchbox::Matchbox};
use crate::tictactoe::BoardState;

/// Beads and usage of one matchbox, without its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchboxRecord {
    pub beads: BTreeMap<usize, u32>,
    pub times_used: u64,
}

impl From<&Matchbox> for MatchboxRecord {
    fn from(matchbox: &Matchbox) -> Self {
        Self {
            beads: matchbox.beads().clone(),
            times_used: matchbox.times_used(),
        }
    }
}

impl MatchboxRecord {
    /// Rebuild the matchbox for `state`, checking the stored beads against the
    /// invariants a live matchbox keeps.
    pub fn into_matchbox(self, state: BoardState, min_beads: u32) -> crate::Result<Matchbox> {
        let invalid = |reason: String| crate::Error::InvalidSnapshot {
            message: format!("matchbox '{}': {reason}", state.encode()),
        };

        if !state.is_canonical() {
            return Err(invalid(format!(
                "state is not canonical (canonical form is '{}')",
                state.canonical().encode()
            )));
        }

        let expected: BTreeSet<usize> = state.empty_positions().into_iter().collect();
        if expected.is_empty() {
            return Err(invalid("state has no empty cells".to_string()));
        }
        let stored: BTreeSet<usize> = self.beads.keys().copied().collect();
        if stored != expected {
            return Err(invalid(format!(
                "moves {stored:?} do not match empty cells {expected:?}"
            )));
        }

        if let Some((position, count)) = self.beads.iter().find(|&(_, &c)| c < min_beads) {
            return Err(invalid(format!(
                "position {position} holds {count} beads, below the minimum of {min_beads}"
            )));
        }

        Ok(Matchbox::from_parts(state, self.beads, self.times_used))
    }
}

/// Progress sample recorded after a learned game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub games: u64,
    pub total_beads: u64,
    pub matchbox_count: usize,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub win_rate: f64,
}

/// Full exported state of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Version of the save format
    pub version: u32,
    pub initial_beads: u32,
    pub reinforcement: ReinforcementValues,
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    #[serde(default)]
    pub history: Vec<HistorySnapshot>,
    pub matchboxes: BTreeMap<BoardState, MatchboxRecord>,
}

impl EngineSnapshot {
    /// Current save format version
    pub const VERSION: u32 = 1;

    /// Check the parts of the snapshot that do not depend on individual matchboxes.
    pub fn validate_header(&self) -> crate::Result<()> {
        let invalid = |message: String| crate::Error::InvalidSnapshot { message };

        if self.version != Self::VERSION {
            return Err(invalid(format!(
                "unsupported version {} (expected {})",
                self.version,
                Self::VERSION
            )));
        }
        if self.reinforcement.min_beads == 0 {
            return Err(invalid("min_beads must be at least 1".to_string()));
        }
        if self.initial_beads < self.reinforcement.min_beads {
            return Err(invalid(format!(
                "initial_beads {} is below min_beads {}",
                self.initial_beads, self.reinforcement.min_beads
            )));
        }
        let total = self
            .wins
            .checked_add(self.losses)
            .and_then(|sum| sum.checked_add(self.draws));
        if total != Some(self.games_played) {
            return Err(invalid(format!(
                "counters disagree: {} wins + {} losses + {} draws != {} games",
                self.wins, self.losses, self.draws, self.games_played
            )));
        }
        Ok(())
    }

    /// Rebuild every matchbox, failing on the first invalid record.
    pub fn to_matchboxes(&self) -> crate::Result<Vec<Matchbox>> {
        self.matchboxes
            .iter()
            .map(|(state, record)| {
                record
                    .clone()
                    .into_matchbox(*state, self.reinforcement.min_beads)
            })
            .collect()
    }
}
