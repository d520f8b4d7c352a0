//! MENACE learning system
//!
//! Matchboxes keyed by canonical state, the weighted bead draw, the reward
//! updates and the shared engine that ties them together.

pub mod engine;
pub mod learning;
pub mod matchbox;
pub mod selector;
pub mod serialization;
pub mod store;

pub use engine::{EngineStats, MenaceEngine};
pub use learning::{
    BeadDelta, LearningReport, LearningUpdater, MoveRecord, Outcome, ReinforcementValues,
};
pub use matchbox::Matchbox;
pub use serialization::{EngineSnapshot, HistorySnapshot, MatchboxRecord};
pub use store::{MatchboxHandle, MatchboxStore, MatchboxSummary};
