//! Error types for the MENACE engine

use thiserror::Error;

use crate::identifiers::SessionId;

/// Main error type for the MENACE engine
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("board string has wrong length: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("position {position} is out of bounds (must be 0-8)")]
    InvalidPosition { position: usize },

    #[error("transform index {index} is out of bounds (must be 0-7)")]
    InvalidTransform { index: usize },

    #[error("invalid move: position {position} is already occupied")]
    CellOccupied { position: usize },

    #[error("it is not {player}'s turn")]
    WrongTurn { player: char },

    #[error("game already over")]
    GameOver,

    #[error("session {id} not found")]
    SessionNotFound { id: SessionId },

    #[error("matchbox for state '{state}' has no weighted moves")]
    ExhaustedMatchbox { state: String },

    #[error("learning references state '{state}' which has no matchbox")]
    MissingMatchbox { state: String },

    #[error("learning references position {position} which is not a move in matchbox '{state}'")]
    UnknownMove { state: String, position: usize },

    #[error("cannot learn from an unresolved game")]
    UnresolvedOutcome,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },
}

/// Broad classification of an [`Error`], for callers that map failures onto
/// their own responses (status codes, retry policy, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input; never retried.
    Validation,
    /// A well-formed move that the game does not allow right now.
    IllegalMove,
    /// The requested session does not exist.
    NotFound,
    /// An internal invariant was violated.
    Internal,
    /// File or serialization failure.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidBoardLength { .. }
            | Error::InvalidCellCharacter { .. }
            | Error::InvalidPosition { .. }
            | Error::InvalidTransform { .. }
            | Error::InvalidConfiguration { .. }
            | Error::InvalidSnapshot { .. } => ErrorKind::Validation,
            Error::CellOccupied { .. } | Error::WrongTurn { .. } | Error::GameOver => {
                ErrorKind::IllegalMove
            }
            Error::SessionNotFound { .. } => ErrorKind::NotFound,
            Error::ExhaustedMatchbox { .. }
            | Error::MissingMatchbox { .. }
            | Error::UnknownMove { .. }
            | Error::UnresolvedOutcome => ErrorKind::Internal,
            Error::Io { .. } | Error::Serialization(_) | Error::SerializationContext { .. } => {
                ErrorKind::Io
            }
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
