//! Game sessions and the registry that serves them

pub mod game;
pub mod registry;

pub use game::{FinishStatus, GameSession, MoveEntry, SessionState, SessionView};
pub use registry::{SessionRegistry, TurnView};
