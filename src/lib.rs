//! MENACE (Matchbox Educable Noughts And Crosses Engine)
//!
//! This crate provides:
//! - A tic-tac-toe board with winning-line detection and symmetry reduction
//! - Matchboxes of beads keyed by canonical state, shared safely across threads
//! - Game sessions that learn from their outcome exactly once
//! - Parallel self-play training and snapshot persistence
//!
//! ```
//! use std::sync::Arc;
//! use menace::{EngineConfig, MenaceEngine, SessionRegistry};
//!
//! let engine = Arc::new(MenaceEngine::new(EngineConfig::new().with_seed(7))?);
//! let registry = SessionRegistry::new(Arc::clone(&engine));
//!
//! let game = registry.create_session(true);
//! let (position, view) = registry.agent_move(game.id)?;
//! assert!(position < 9);
//! assert_eq!(view.history.len(), 1);
//! # Ok::<(), menace::Error>(())
//! ```

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod identifiers;
pub mod menace;
pub mod ports;
pub mod session;
pub mod tictactoe;
pub mod training;
pub mod utils;

pub use app::EngineConfig;
pub use error::{Error, ErrorKind, Result};
pub use identifiers::SessionId;
pub use menace::{EngineSnapshot, EngineStats, MatchboxSummary, MenaceEngine, Outcome};
pub use session::{FinishStatus, SessionRegistry, SessionView};
pub use tictactoe::{BoardState, Player, normalize};
pub use training::{CancellationFlag, TrainingConfig, TrainingSummary, train};
