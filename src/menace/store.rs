//! Concurrent matchbox storage keyed by canonical board state.
//!
//! The map is split into lock-striped shards chosen by the key's hash, and each
//! matchbox sits behind its own mutex. Creating a matchbox takes one shard's
//! write lock, so creation is exactly-once per state; changing beads takes only
//! that matchbox's mutex, so updates to different states never contend.

use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, RandomState},
    sync::{Arc, Mutex, RwLock},
};

use serde::{Deserialize, Serialize};

use super::matchbox::Matchbox;
use crate::{
    tictactoe::BoardState,
    utils::{lock, read, write},
};

/// Shared handle to one matchbox. Lock it to draw or change beads.
pub type MatchboxHandle = Arc<Mutex<Matchbox>>;

/// Number of shards used by [`MatchboxStore::new`].
pub const DEFAULT_SHARDS: usize = 16;

type Shard = RwLock<HashMap<BoardState, MatchboxHandle>>;

/// Point-in-time copy of one matchbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchboxSummary {
    pub canonical_state: BoardState,
    pub weights: BTreeMap<usize, u32>,
    pub usage_count: u64,
    pub total_beads: u64,
}

impl From<&Matchbox> for MatchboxSummary {
    fn from(matchbox: &Matchbox) -> Self {
        Self {
            canonical_state: *matchbox.state(),
            weights: matchbox.beads().clone(),
            usage_count: matchbox.times_used(),
            total_beads: matchbox.total_beads(),
        }
    }
}

#[derive(Debug)]
pub struct MatchboxStore {
    shards: Box<[Shard]>,
    hasher: RandomState,
}

impl MatchboxStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create a store with `shards` lock stripes (at least one).
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    fn shard(&self, state: &BoardState) -> &Shard {
        let index = self.hasher.hash_one(state) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Look up a matchbox without creating it.
    pub fn get(&self, state: &BoardState) -> Option<MatchboxHandle> {
        read(self.shard(state)).get(state).cloned()
    }

    /// Return the matchbox for `state`, creating it with `initial_beads` on every
    /// empty cell if this is the first time the state is seen.
    ///
    /// `state` is expected to be canonical; callers normalize first.
    pub fn get_or_create(&self, state: &BoardState, initial_beads: u32) -> MatchboxHandle {
        debug_assert!(state.is_canonical(), "matchbox key {state:?} is not canonical");

        let shard = self.shard(state);
        if let Some(handle) = read(shard).get(state) {
            return Arc::clone(handle);
        }

        let mut map = write(shard);
        let handle = map.entry(*state).or_insert_with(|| {
            log::debug!("creating matchbox for {}", state.encode());
            Arc::new(Mutex::new(Matchbox::new(*state, initial_beads)))
        });
        Arc::clone(handle)
    }

    /// Number of matchboxes
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| read(shard).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies of every matchbox, ordered by canonical state text.
    pub fn snapshot(&self) -> Vec<MatchboxSummary> {
        let mut summaries: Vec<MatchboxSummary> = self
            .handles()
            .iter()
            .map(|handle| MatchboxSummary::from(&*lock(handle)))
            .collect();
        summaries.sort_by_key(|summary| summary.canonical_state);
        summaries
    }

    /// Sum of beads across all matchboxes
    pub fn total_beads(&self) -> u64 {
        self.handles()
            .iter()
            .map(|handle| lock(handle).total_beads())
            .sum()
    }

    /// Drop every matchbox.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            write(shard).clear();
        }
    }

    /// Replace the whole contents with `matchboxes`. All shard locks are held
    /// for the swap, so no reader sees a half-loaded store.
    pub fn replace_all(&self, matchboxes: impl IntoIterator<Item = Matchbox>) {
        let mut guards: Vec<_> = self.shards.iter().map(|shard| write(shard)).collect();
        for guard in guards.iter_mut() {
            guard.clear();
        }
        for matchbox in matchboxes {
            let state = *matchbox.state();
            let index = self.hasher.hash_one(state) as usize % self.shards.len();
            guards[index].insert(state, Arc::new(Mutex::new(matchbox)));
        }
    }

    fn handles(&self) -> Vec<MatchboxHandle> {
        self.shards
            .iter()
            .flat_map(|shard| read(shard).values().cloned().collect::<Vec<_>>())
            .collect()
    }
}

impl Default for MatchboxStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::tictactoe::Player;

    #[test]
    fn get_or_create_returns_the_same_matchbox() {
        let store = MatchboxStore::new();
        let state = BoardState::new();

        let first = store.get_or_create(&state, 3);
        lock(&first).add_beads(4, 10);
        let second = store.get_or_create(&state, 99);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(lock(&second).bead_count(4), Some(13));
        assert_eq!(lock(&second).bead_count(0), Some(3));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_does_not_create() {
        let store = MatchboxStore::with_shards(2);
        assert!(store.get(&BoardState::new()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_creation_happens_once() {
        let store = Arc::new(MatchboxStore::with_shards(4));
        let state = BoardState::new().make_move(0, Player::X).unwrap().canonical();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.get_or_create(&state, 3))
            })
            .collect();
        let results: Vec<MatchboxHandle> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(store.len(), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let store = Arc::new(MatchboxStore::new());
        let state = BoardState::new();
        store.get_or_create(&state, 1);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        let handle = store.get(&state).unwrap();
                        lock(&handle).add_beads(4, 1);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let handle = store.get(&state).unwrap();
        assert_eq!(lock(&handle).bead_count(4), Some(8_001));
    }

    #[test]
    fn snapshot_is_sorted_and_replace_all_swaps_contents() {
        let store = MatchboxStore::new();
        let corner = BoardState::parse("X________").unwrap();
        store.get_or_create(&BoardState::new(), 3);
        store.get_or_create(&corner, 3);

        let summaries = store.snapshot();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].canonical_state, corner);
        assert_eq!(store.total_beads(), 9 * 3 + 8 * 3);

        store.replace_all(vec![Matchbox::new(corner, 5)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_beads(), 8 * 5);

        store.clear();
        assert!(store.is_empty());
    }
}
