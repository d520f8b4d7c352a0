//! Self-play training against scripted or random opponents
//!
//! Games run on a rayon pool against the shared engine. Every game is a normal
//! session: the agent draws from its matchboxes, the opponent picks a move, and
//! the finished game is learned exactly once. Cancellation is only observed
//! before a game starts, so a started game always finishes and learns.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use rand::{Rng, SeedableRng, prelude::IndexedRandom, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    menace::{MenaceEngine, Outcome},
    session::FinishStatus,
    tictactoe::BoardState,
    utils::win_rate,
};

/// Type of opponent for training
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    /// Uniformly random empty cell
    Random,
    /// First empty cell in the preference list, else the lowest empty cell
    Scripted(Vec<usize>),
}

impl OpponentKind {
    /// Select the opponent's move on `board`.
    pub fn select_move(&self, board: &BoardState, rng: &mut impl Rng) -> crate::Result<usize> {
        let moves = board.empty_positions();
        let chosen = match self {
            OpponentKind::Random => moves.choose(rng).copied(),
            OpponentKind::Scripted(preferences) => preferences
                .iter()
                .copied()
                .find(|p| moves.contains(p))
                .or_else(|| moves.first().copied()),
        };
        chosen.ok_or(crate::Error::GameOver)
    }
}

/// Who opens each training game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstMover {
    #[default]
    Agent,
    Opponent,
    /// Agent opens even-numbered games
    Alternate,
    /// Coin flip per game
    Random,
}

impl FirstMover {
    fn agent_first(self, game_index: u64, rng: &mut impl Rng) -> bool {
        match self {
            FirstMover::Agent => true,
            FirstMover::Opponent => false,
            FirstMover::Alternate => game_index % 2 == 0,
            FirstMover::Random => rng.random_bool(0.5),
        }
    }
}

/// Configuration for a training run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub games: u64,
    pub opponent: OpponentKind,
    pub first_mover: FirstMover,
    /// Worker threads (0 = rayon's default)
    pub workers: usize,
}

impl TrainingConfig {
    pub fn new(games: u64) -> Self {
        Self {
            games,
            opponent: OpponentKind::Random,
            first_mover: FirstMover::default(),
            workers: 0,
        }
    }

    pub fn with_opponent(mut self, opponent: OpponentKind) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn with_first_mover(mut self, first_mover: FirstMover) -> Self {
        self.first_mover = first_mover;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// Shared stop signal for a training run.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Results from training
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub games: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    /// True when the run stopped before playing every requested game
    pub cancelled: bool,
}

impl TrainingSummary {
    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.games)
    }

    fn count(&mut self, outcome: Outcome) {
        self.games += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Unresolved => {}
        }
    }
}

/// Called with the number of games completed so far.
pub type ProgressFn<'a> = &'a (dyn Fn(u64) + Sync);

/// Play `config.games` self-play games and learn from each.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidConfiguration`] if the worker pool cannot be
/// built, or the first error raised by a game.
pub fn train(
    engine: &MenaceEngine,
    config: &TrainingConfig,
    cancel: &CancellationFlag,
    progress: Option<ProgressFn<'_>>,
) -> crate::Result<TrainingSummary> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .map_err(|e| crate::Error::InvalidConfiguration {
            message: format!("cannot start training workers: {e}"),
        })?;

    log::info!(
        "training {} games against {:?} ({} workers)",
        config.games,
        config.opponent,
        pool.current_num_threads()
    );

    let completed = AtomicU64::new(0);
    let log_every = (config.games / 10).max(1);

    let outcomes: Vec<Option<Outcome>> = pool.install(|| {
        (0..config.games)
            .into_par_iter()
            .map(|index| -> crate::Result<Option<Outcome>> {
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                let outcome = play_game(engine, config, index)?;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(report) = progress {
                    report(done);
                }
                if done % log_every == 0 {
                    let stats = engine.stats();
                    log::info!(
                        "{done}/{} games, win rate {:.3}, {} matchboxes",
                        config.games,
                        stats.win_rate,
                        stats.matchbox_count
                    );
                }
                Ok(Some(outcome))
            })
            .collect::<crate::Result<Vec<_>>>()
    })?;

    let mut summary = TrainingSummary::default();
    for outcome in &outcomes {
        match outcome {
            Some(outcome) => summary.count(*outcome),
            None => summary.cancelled = true,
        }
    }

    if summary.cancelled {
        log::info!(
            "training cancelled after {} of {} games",
            summary.games,
            config.games
        );
    }
    Ok(summary)
}

/// Random source for the opponent and first-mover choice of one game.
fn game_rng(engine: &MenaceEngine, index: u64) -> StdRng {
    match engine.config().seed {
        Some(seed) => StdRng::seed_from_u64(seed.rotate_left(32) ^ index),
        None => StdRng::from_os_rng(),
    }
}

fn play_game(engine: &MenaceEngine, config: &TrainingConfig, index: u64) -> crate::Result<Outcome> {
    let mut rng = game_rng(engine, index);
    let agent_first = config.first_mover.agent_first(index, &mut rng);
    let mut session = engine.new_session(agent_first);

    while !session.is_finished() {
        if session.turn() == session.agent_player() {
            session.agent_move(engine)?;
        } else {
            let position = config.opponent.select_move(session.board(), &mut rng)?;
            session.apply_opponent_move(position)?;
        }
    }

    let status = engine.conclude(&mut session)?;
    debug_assert!(matches!(status, FinishStatus::Learned(_)));
    Ok(session.outcome())
}
