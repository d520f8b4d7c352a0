//! Shared MENACE engine
//!
//! One engine is shared (behind an `Arc`) by every session and training worker.
//! It owns the matchbox store, the reinforcement parameters, the aggregate
//! counters with their progress history, and the session id counter.

use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    learning::{LearningReport, LearningUpdater, MoveRecord, Outcome, ReinforcementValues},
    serialization::{EngineSnapshot, HistorySnapshot, MatchboxRecord},
    store::{MatchboxStore, MatchboxSummary},
};
use crate::{
    app::EngineConfig,
    identifiers::SessionId,
    session::{FinishStatus, GameSession},
    tictactoe::BoardState,
    utils::{lock, win_rate},
};

/// Aggregate learning statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub win_rate: f64,
    pub matchbox_count: usize,
    pub total_beads: u64,
}

#[derive(Debug, Default)]
struct GameRecord {
    games_played: u64,
    wins: u64,
    losses: u64,
    draws: u64,
    history: Vec<HistorySnapshot>,
}

impl GameRecord {
    fn count(&mut self, outcome: Outcome) {
        self.games_played += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Unresolved => {}
        }
    }
}

/// Whether the progress history samples the state after `games` games.
fn samples_history(games: u64) -> bool {
    match games {
        0 => false,
        1..=100 => true,
        101..=1000 => games % 10 == 0,
        _ => games % 100 == 0,
    }
}

#[derive(Debug)]
pub struct MenaceEngine {
    config: EngineConfig,
    store: MatchboxStore,
    updater: LearningUpdater,
    record: Mutex<GameRecord>,
    next_session: AtomicU64,
}

impl MenaceEngine {
    /// Create an engine with an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if `config` fails
    /// [`EngineConfig::validate`].
    pub fn new(config: EngineConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            store: MatchboxStore::with_shards(config.shards),
            updater: LearningUpdater::new(config.reinforcement),
            record: Mutex::new(GameRecord::default()),
            next_session: AtomicU64::new(1),
            config,
        })
    }

    /// Create an engine that adopts the snapshot's bead parameters and then
    /// loads its matchboxes, counters and history. Seed and shard count come
    /// from `config`.
    pub fn from_snapshot(config: EngineConfig, snapshot: EngineSnapshot) -> crate::Result<Self> {
        let config = config
            .with_initial_beads(snapshot.initial_beads)
            .with_reinforcement(snapshot.reinforcement);
        let engine = Self::new(config)?;
        engine.import_state(snapshot)?;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &MatchboxStore {
        &self.store
    }

    pub fn reinforcement(&self) -> ReinforcementValues {
        self.updater.values()
    }

    /// Allocate the next session id.
    pub fn next_session_id(&self) -> SessionId {
        SessionId::new(self.next_session.fetch_add(1, Ordering::Relaxed))
    }

    /// Random source for session `id`: derived from the configured seed when
    /// there is one, otherwise from OS entropy.
    pub fn session_rng(&self, id: SessionId) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id.value())),
            None => StdRng::from_os_rng(),
        }
    }

    /// Start a new game with a fresh id and its own random source.
    pub fn new_session(&self, agent_plays_first: bool) -> GameSession {
        let id = self.next_session_id();
        GameSession::new(id, agent_plays_first, self.session_rng(id))
    }

    /// Pick the agent's move on `board`.
    ///
    /// The board is normalized, its matchbox fetched (created on first sight),
    /// a bead drawn in canonical coordinates and the result mapped back.
    /// Returns the move on `board` and the record to learn from.
    pub fn choose_move(
        &self,
        board: &BoardState,
        rng: &mut impl Rng,
    ) -> crate::Result<(usize, MoveRecord)> {
        let context = board.canonical_context();
        let handle = self
            .store
            .get_or_create(&context.state, self.config.initial_beads);
        let position = lock(&handle).sample_move(rng)?;
        let original = context.map_canonical_to_original(position)?;

        log::debug!(
            "drew canonical move {position} in {} (transform {}), playing {original}",
            context.state.encode(),
            context.transform.index()
        );

        Ok((
            original,
            MoveRecord {
                state: context.state,
                position,
                transform: context.transform,
            },
        ))
    }

    /// Learn from a finished session exactly once.
    ///
    /// An unfinished session yields [`FinishStatus::InProgress`] and a session
    /// that was already learned yields [`FinishStatus::AlreadyFinished`]; neither
    /// changes anything.
    pub fn conclude(&self, session: &mut GameSession) -> crate::Result<FinishStatus> {
        if !session.is_finished() {
            return Ok(FinishStatus::InProgress);
        }
        if session.is_learned() {
            log::warn!("session {} already learned, ignoring finish", session.id());
            return Ok(FinishStatus::AlreadyFinished);
        }

        let report = self.record_game(session.trail(), session.outcome())?;
        session.mark_learned();
        Ok(FinishStatus::Learned(report))
    }

    /// Apply `outcome` to `trail` and count the game.
    pub fn record_game(
        &self,
        trail: &[MoveRecord],
        outcome: Outcome,
    ) -> crate::Result<LearningReport> {
        let report = self.updater.learn(&self.store, trail, outcome)?;

        let mut record = lock(&self.record);
        record.count(outcome);
        if samples_history(record.games_played) {
            let sample = HistorySnapshot {
                games: record.games_played,
                total_beads: self.store.total_beads(),
                matchbox_count: self.store.len(),
                wins: record.wins,
                losses: record.losses,
                draws: record.draws,
                win_rate: win_rate(record.wins, record.games_played),
            };
            record.history.push(sample);
        }
        Ok(report)
    }

    pub fn stats(&self) -> EngineStats {
        let record = lock(&self.record);
        EngineStats {
            games_played: record.games_played,
            wins: record.wins,
            losses: record.losses,
            draws: record.draws,
            win_rate: win_rate(record.wins, record.games_played),
            matchbox_count: self.store.len(),
            total_beads: self.store.total_beads(),
        }
    }

    /// Progress samples in the order they were taken.
    pub fn history(&self) -> Vec<HistorySnapshot> {
        lock(&self.record).history.clone()
    }

    /// Look up the matchbox for any orientation of `raw_board` without
    /// creating it.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `raw_board` is not a 9-cell board.
    ///
    /// # Examples
    ///
    /// ```
    /// use menace::{app::EngineConfig, menace::MenaceEngine};
    ///
    /// let engine = MenaceEngine::new(EngineConfig::new().with_seed(1))?;
    /// assert!(engine.query_matchbox("________X")?.is_none());
    /// # Ok::<(), menace::Error>(())
    /// ```
    pub fn query_matchbox(&self, raw_board: &str) -> crate::Result<Option<MatchboxSummary>> {
        let canonical = BoardState::parse(raw_board)?.canonical();
        Ok(self
            .store
            .get(&canonical)
            .map(|handle| MatchboxSummary::from(&*lock(&handle))))
    }

    /// Every matchbox, ordered by canonical state text.
    pub fn list_matchboxes(&self) -> Vec<MatchboxSummary> {
        self.store.snapshot()
    }

    pub fn export_state(&self) -> EngineSnapshot {
        let record = lock(&self.record);
        let matchboxes: BTreeMap<BoardState, MatchboxRecord> = self
            .store
            .snapshot()
            .into_iter()
            .map(|summary| {
                (
                    summary.canonical_state,
                    MatchboxRecord {
                        beads: summary.weights,
                        times_used: summary.usage_count,
                    },
                )
            })
            .collect();

        log::info!(
            "exporting {} matchboxes after {} games",
            matchboxes.len(),
            record.games_played
        );

        EngineSnapshot {
            version: EngineSnapshot::VERSION,
            initial_beads: self.config.initial_beads,
            reinforcement: self.updater.values(),
            games_played: record.games_played,
            wins: record.wins,
            losses: record.losses,
            draws: record.draws,
            history: record.history.clone(),
            matchboxes,
        }
    }

    /// Replace matchboxes, counters and history with the snapshot's.
    ///
    /// The whole snapshot is validated first; on error the engine is unchanged.
    /// Bead parameters stay those of this engine (use
    /// [`MenaceEngine::from_snapshot`] to adopt the snapshot's).
    pub fn import_state(&self, snapshot: EngineSnapshot) -> crate::Result<()> {
        snapshot.validate_header()?;
        let matchboxes = snapshot.to_matchboxes()?;

        if snapshot.reinforcement != self.updater.values()
            || snapshot.initial_beads != self.config.initial_beads
        {
            log::warn!(
                "snapshot bead parameters {:?} (initial {}) differ from engine's {:?} (initial {}); keeping engine's",
                snapshot.reinforcement,
                snapshot.initial_beads,
                self.updater.values(),
                self.config.initial_beads
            );
        }
        if let Some((state, position)) = matchboxes.iter().find_map(|m| {
            m.all_beads()
                .find(|&(_, count)| count < self.updater.values().min_beads)
                .map(|(p, _)| (*m.state(), p))
        }) {
            return Err(crate::Error::InvalidSnapshot {
                message: format!(
                    "matchbox '{}' position {position} is below this engine's minimum of {} beads",
                    state.encode(),
                    self.updater.values().min_beads
                ),
            });
        }

        let count = matchboxes.len();
        let mut record = lock(&self.record);
        self.store.replace_all(matchboxes);
        *record = GameRecord {
            games_played: snapshot.games_played,
            wins: snapshot.wins,
            losses: snapshot.losses,
            draws: snapshot.draws,
            history: snapshot.history,
        };

        log::info!(
            "imported {count} matchboxes and {} games",
            record.games_played
        );
        Ok(())
    }

    /// Forget all matchboxes, counters and history.
    pub fn reset(&self) {
        let mut record = lock(&self.record);
        self.store.clear();
        *record = GameRecord::default();
        log::info!("engine reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Player;

    fn engine() -> MenaceEngine {
        MenaceEngine::new(EngineConfig::new().with_seed(7)).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig::new().with_initial_beads(0);
        assert!(MenaceEngine::new(config).is_err());
    }

    #[test]
    fn chosen_move_is_legal_on_the_original_board() {
        let engine = engine();
        let mut rng = engine.session_rng(SessionId::new(1));
        let board = BoardState::parse("__X_O____").unwrap();

        for _ in 0..50 {
            let (original, record) = engine.choose_move(&board, &mut rng).unwrap();
            assert!(board.empty_positions().contains(&original));
            assert_eq!(record.state, board.canonical());
            assert_eq!(
                record.transform.inverse_transform_position(record.position).unwrap(),
                original
            );
        }
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn session_ids_are_unique_and_increasing() {
        let engine = engine();
        let a = engine.next_session_id();
        let b = engine.next_session_id();
        assert!(b.value() > a.value());
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let a = engine();
        let b = engine();
        let id = SessionId::new(5);
        let mut rng_a = a.session_rng(id);
        let mut rng_b = b.session_rng(id);
        let draws_a: Vec<u64> = (0..5).map(|_| rng_a.random()).collect();
        let draws_b: Vec<u64> = (0..5).map(|_| rng_b.random()).collect();
        assert_eq!(draws_a, draws_b);
        assert_ne!(draws_a[0], a.session_rng(SessionId::new(6)).random::<u64>());
    }

    #[test]
    fn conclude_learns_exactly_once() {
        let engine = engine();
        let mut session = engine.new_session(true);
        for opponent in [3, 4, 5, 6, 7, 8, 0, 1, 2] {
            if session.is_finished() {
                break;
            }
            session.agent_move(&engine).unwrap();
            if session.is_finished() {
                break;
            }
            if session.board().empty_positions().contains(&opponent) {
                session.apply_opponent_move(opponent).unwrap();
            } else {
                let fallback = session.board().empty_positions()[0];
                session.apply_opponent_move(fallback).unwrap();
            }
        }
        assert!(session.is_finished());

        let status = engine.conclude(&mut session).unwrap();
        assert!(matches!(status, FinishStatus::Learned(_)));
        let beads_after_first = engine.stats().total_beads;

        assert_eq!(
            engine.conclude(&mut session).unwrap(),
            FinishStatus::AlreadyFinished
        );
        let stats = engine.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.wins + stats.losses + stats.draws, 1);
        assert_eq!(stats.total_beads, beads_after_first);
    }

    #[test]
    fn unfinished_session_is_in_progress() {
        let engine = engine();
        let mut session = engine.new_session(false);
        assert_eq!(
            engine.conclude(&mut session).unwrap(),
            FinishStatus::InProgress
        );
        assert_eq!(engine.stats().games_played, 0);
    }

    #[test]
    fn history_sampling_cadence() {
        assert!(!samples_history(0));
        assert!(samples_history(1));
        assert!(samples_history(100));
        assert!(!samples_history(101));
        assert!(samples_history(110));
        assert!(samples_history(1000));
        assert!(!samples_history(1010));
        assert!(samples_history(1100));
    }

    #[test]
    fn record_game_updates_counters_and_history() {
        let engine = engine();
        let mut rng = engine.session_rng(SessionId::new(1));
        let (_, record) = engine.choose_move(&BoardState::new(), &mut rng).unwrap();

        engine.record_game(&[record], Outcome::Win).unwrap();
        engine.record_game(&[record], Outcome::Loss).unwrap();

        let stats = engine.stats();
        assert_eq!((stats.wins, stats.losses, stats.draws), (1, 1, 0));
        assert!((stats.win_rate - 0.5).abs() < 1e-12);
        let history = engine.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].games, 2);
        assert_eq!(history[1].matchbox_count, 1);
    }

    #[test]
    fn query_matchbox_normalizes_without_creating() {
        let engine = engine();
        assert!(engine.query_matchbox("X________").unwrap().is_none());

        let mut rng = engine.session_rng(SessionId::new(1));
        let board = BoardState::new().make_move(8, Player::X).unwrap();
        engine.choose_move(&board, &mut rng).unwrap();

        let summary = engine.query_matchbox("__x......").unwrap().unwrap();
        assert_eq!(summary.canonical_state, board.canonical());
        assert_eq!(summary.weights.len(), 8);
        assert_eq!(summary.usage_count, 1);
        assert!(engine.query_matchbox("X").is_err());
        assert!(engine.query_matchbox("___\n___\n___").is_err());
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn export_import_roundtrip_and_reset() {
        let source = engine();
        let mut rng = source.session_rng(SessionId::new(1));
        let (_, record) = source.choose_move(&BoardState::new(), &mut rng).unwrap();
        source.record_game(&[record], Outcome::Draw).unwrap();

        let snapshot = source.export_state();
        let target = engine();
        target.import_state(snapshot.clone()).unwrap();

        assert_eq!(target.list_matchboxes(), source.list_matchboxes());
        assert_eq!(target.stats(), source.stats());
        assert_eq!(target.export_state(), snapshot);

        target.reset();
        let stats = target.stats();
        assert_eq!(stats.games_played, 0);
        assert_eq!(stats.matchbox_count, 0);
        assert!(target.history().is_empty());
    }

    #[test]
    fn rejected_import_leaves_engine_unchanged() {
        let engine = engine();
        let mut rng = engine.session_rng(SessionId::new(1));
        engine.choose_move(&BoardState::new(), &mut rng).unwrap();

        let mut snapshot = engine.export_state();
        let not_canonical = BoardState::parse("________X").unwrap();
        snapshot.matchboxes.insert(
            not_canonical,
            MatchboxRecord {
                beads: not_canonical.empty_positions().into_iter().map(|p| (p, 3)).collect(),
                times_used: 0,
            },
        );

        let err = engine.import_state(snapshot).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn from_snapshot_adopts_bead_parameters() {
        let values = ReinforcementValues {
            win: 5,
            draw: 2,
            loss: 2,
            min_beads: 2,
        };
        let source =
            MenaceEngine::new(EngineConfig::new().with_initial_beads(4).with_reinforcement(values))
                .unwrap();
        let restored = MenaceEngine::from_snapshot(EngineConfig::new(), source.export_state())
            .unwrap();
        assert_eq!(restored.reinforcement(), values);
        assert_eq!(restored.config().initial_beads, 4);
    }
}
