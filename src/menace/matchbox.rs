//! Matchbox implementation for MENACE

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::selector;
use crate::tictactoe::BoardState;

/// A matchbox containing beads for one canonical board state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchbox {
    /// Canonical board state this matchbox belongs to
    state: BoardState,
    /// Beads for each possible move (position -> count), in canonical coordinates
    beads: BTreeMap<usize, u32>,
    /// Number of draws taken from this matchbox
    times_used: u64,
}

impl Matchbox {
    /// Create a matchbox with `initial_beads` on every empty cell of `state`.
    pub fn new(state: BoardState, initial_beads: u32) -> Self {
        let beads = state
            .empty_positions()
            .into_iter()
            .map(|pos| (pos, initial_beads))
            .collect();

        Matchbox {
            state,
            beads,
            times_used: 0,
        }
    }

    /// Rebuild a matchbox from stored parts without validation.
    pub(crate) fn from_parts(state: BoardState, beads: BTreeMap<usize, u32>, times_used: u64) -> Self {
        Matchbox {
            state,
            beads,
            times_used,
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn times_used(&self) -> u64 {
        self.times_used
    }

    /// Get the bead count for a specific position
    pub fn bead_count(&self, position: usize) -> Option<u32> {
        self.beads.get(&position).copied()
    }

    pub fn beads(&self) -> &BTreeMap<usize, u32> {
        &self.beads
    }

    /// Get an iterator over all position-bead pairs, by ascending position
    pub fn all_beads(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.beads.iter().map(|(&pos, &count)| (pos, count))
    }

    /// Get total bead count
    pub fn total_beads(&self) -> u64 {
        self.beads.values().map(|&count| u64::from(count)).sum()
    }

    /// Selection probability of each move.
    pub fn probabilities(&self) -> BTreeMap<usize, f64> {
        let total = self.total_beads();
        if total == 0 {
            return BTreeMap::new();
        }
        self.all_beads()
            .map(|(pos, count)| (pos, f64::from(count) / total as f64))
            .collect()
    }

    /// Draw a move and count the use.
    pub fn sample_move(&mut self, rng: &mut impl Rng) -> crate::Result<usize> {
        let position = selector::draw(self, rng)?;
        self.times_used += 1;
        Ok(position)
    }

    /// Add `amount` beads to `position`. Returns the new count, or `None` if the
    /// position is not a move of this matchbox.
    pub fn add_beads(&mut self, position: usize, amount: u32) -> Option<u32> {
        let count = self.beads.get_mut(&position)?;
        *count = count.saturating_add(amount);
        Some(*count)
    }

    /// Remove up to `amount` beads from `position` without going below `floor`.
    pub fn remove_beads(&mut self, position: usize, amount: u32, floor: u32) -> Option<u32> {
        let count = self.beads.get_mut(&position)?;
        *count = count.saturating_sub(amount).max(floor);
        Some(*count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Player;

    #[test]
    fn new_matchbox_covers_exactly_the_empty_cells() {
        let state = BoardState::new()
            .make_move(4, Player::X)
            .unwrap()
            .make_move(0, Player::O)
            .unwrap();
        let matchbox = Matchbox::new(state, 3);

        let positions: Vec<usize> = matchbox.all_beads().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![1, 2, 3, 5, 6, 7, 8]);
        assert!(matchbox.all_beads().all(|(_, c)| c == 3));
        assert_eq!(matchbox.total_beads(), 21);
        assert_eq!(matchbox.times_used(), 0);
    }

    #[test]
    fn remove_beads_respects_floor() {
        let mut matchbox = Matchbox::new(BoardState::new(), 3);
        assert_eq!(matchbox.remove_beads(0, 1, 1), Some(2));
        assert_eq!(matchbox.remove_beads(0, 5, 1), Some(1));
        assert_eq!(matchbox.remove_beads(0, 1, 1), Some(1));
        assert_eq!(matchbox.add_beads(0, 3), Some(4));
        assert_eq!(matchbox.add_beads(9, 3), None);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let mut matchbox = Matchbox::new(BoardState::new(), 1);
        matchbox.add_beads(4, 7);
        let probabilities = matchbox.probabilities();
        let sum: f64 = probabilities.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((probabilities[&4] - 0.5).abs() < 1e-12);
    }
}
