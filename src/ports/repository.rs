//! Repository port for engine snapshot persistence.

use std::path::Path;

use crate::{Result, menace::EngineSnapshot};

/// Port for persisting and loading learned engine state.
///
/// Implementations choose the storage format; the engine only ever hands over
/// and receives an [`EngineSnapshot`].
///
/// # Examples
///
/// ```no_run
/// use menace::ports::SnapshotRepository;
/// use menace::menace::MenaceEngine;
/// use std::path::Path;
///
/// fn checkpoint<R: SnapshotRepository>(
///     repo: &R,
///     engine: &MenaceEngine,
///     path: &Path,
/// ) -> menace::Result<()> {
///     repo.save(&engine.export_state(), path)
/// }
/// ```
pub trait SnapshotRepository {
    /// Save a snapshot to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization fails.
    fn save(&self, snapshot: &EngineSnapshot, path: &Path) -> Result<()>;

    /// Load a snapshot from persistent storage.
    ///
    /// Only the encoding is checked here; the engine validates the contents on
    /// import.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is stored at `path` or it cannot be decoded.
    fn load(&self, path: &Path) -> Result<EngineSnapshot>;
}
