//! Reward and penalty updates applied after a finished game.

use serde::{Deserialize, Serialize};

use super::store::MatchboxStore;
use crate::{
    tictactoe::{BoardState, D4Transform, GameOutcome, Player},
    utils::lock,
};

/// MENACE reinforcement values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReinforcementValues {
    /// Beads added to every move of a won game
    pub win: u32,
    /// Beads added to every move of a drawn game
    pub draw: u32,
    /// Beads removed from every move of a lost game
    pub loss: u32,
    /// No move ever drops below this many beads
    pub min_beads: u32,
}

impl Default for ReinforcementValues {
    fn default() -> Self {
        ReinforcementValues {
            win: 3,
            draw: 1,
            loss: 1,
            min_beads: 1,
        }
    }
}

/// Result of a game from the agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Unresolved,
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Outcome of `board` for the side `agent` plays.
    pub fn for_agent(board: &BoardState, agent: Player) -> Self {
        match board.outcome() {
            Some(GameOutcome::Win(winner)) if winner == agent => Outcome::Win,
            Some(GameOutcome::Win(_)) => Outcome::Loss,
            Some(GameOutcome::Draw) => Outcome::Draw,
            None => Outcome::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        *self != Outcome::Unresolved
    }
}

/// One move chosen by the agent, in canonical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub state: BoardState,
    pub position: usize,
    pub transform: D4Transform,
}

/// Signed bead change applied to each recorded move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeadDelta {
    Add(u32),
    Remove(u32),
}

impl BeadDelta {
    pub fn signed(&self) -> i64 {
        match self {
            BeadDelta::Add(n) => i64::from(*n),
            BeadDelta::Remove(n) => -i64::from(*n),
        }
    }
}

/// Summary of one applied learning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningReport {
    pub outcome: Outcome,
    pub moves_updated: usize,
    pub delta: i64,
}

/// Applies reinforcement to the matchboxes a game touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct LearningUpdater {
    values: ReinforcementValues,
}

impl LearningUpdater {
    pub fn new(values: ReinforcementValues) -> Self {
        Self { values }
    }

    pub fn values(&self) -> ReinforcementValues {
        self.values
    }

    /// Bead change for `outcome`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnresolvedOutcome`] for [`Outcome::Unresolved`].
    pub fn delta(&self, outcome: Outcome) -> crate::Result<BeadDelta> {
        match outcome {
            Outcome::Win => Ok(BeadDelta::Add(self.values.win)),
            Outcome::Draw => Ok(BeadDelta::Add(self.values.draw)),
            Outcome::Loss => Ok(BeadDelta::Remove(self.values.loss)),
            Outcome::Unresolved => Err(crate::Error::UnresolvedOutcome),
        }
    }

    /// Apply `outcome` to every move in `trail`.
    ///
    /// Every record is checked against the store before any bead changes, so a
    /// trail naming a missing matchbox or move leaves the store untouched. Each
    /// update holds only the lock of the matchbox it changes.
    pub fn learn(
        &self,
        store: &MatchboxStore,
        trail: &[MoveRecord],
        outcome: Outcome,
    ) -> crate::Result<LearningReport> {
        let delta = self.delta(outcome)?;

        let mut targets = Vec::with_capacity(trail.len());
        for record in trail {
            let handle = store.get(&record.state).ok_or_else(|| {
                log::error!("move trail names {} which has no matchbox", record.state.encode());
                crate::Error::MissingMatchbox {
                    state: record.state.encode(),
                }
            })?;
            if lock(&handle).bead_count(record.position).is_none() {
                log::error!(
                    "move trail names position {} missing from matchbox {}",
                    record.position,
                    record.state.encode()
                );
                return Err(crate::Error::UnknownMove {
                    state: record.state.encode(),
                    position: record.position,
                });
            }
            targets.push((handle, record.position));
        }

        for (handle, position) in &targets {
            let mut matchbox = lock(handle);
            let updated = match delta {
                BeadDelta::Add(amount) => matchbox.add_beads(*position, amount),
                BeadDelta::Remove(amount) => {
                    matchbox.remove_beads(*position, amount, self.values.min_beads)
                }
            };
            debug_assert!(updated.is_some(), "matchbox keys never disappear");
        }

        log::debug!(
            "applied {:+} beads to {} moves after {:?}",
            delta.signed(),
            targets.len(),
            outcome
        );

        Ok(LearningReport {
            outcome,
            moves_updated: targets.len(),
            delta: delta.signed(),
        })
    }
}
