//! Identifier types for game sessions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Unique identifier for a game session owned by a
/// [`SessionRegistry`](crate::session::SessionRegistry).
///
/// Ids are allocated from a monotonically increasing counter on the engine and
/// are never reused within one engine's lifetime.
///
/// # Examples
///
/// ```
/// use menace::identifiers::SessionId;
///
/// let id: SessionId = "17".parse().unwrap();
/// assert_eq!(id, SessionId::new(17));
/// assert_eq!(id.to_string(), "17");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
