//! Tic-Tac-Toe board, winning lines and symmetry reduction

pub mod board;
pub mod lines;
pub mod symmetry;

pub use board::{BoardState, Cell, GameOutcome, Player};
pub use lines::{LineAnalyzer, WINNING_LINES};
pub use symmetry::{CanonicalContext, D4Transform, inverse_transform, normalize, transform};
