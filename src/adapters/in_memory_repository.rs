//! In-memory snapshot repository for testing.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    Result, error::Error, menace::EngineSnapshot, ports::SnapshotRepository, utils::lock,
};

/// Keeps encoded snapshots in a shared map keyed by path, so tests exercise
/// the MessagePack encoding without touching the file system.
///
/// All clones share the same storage.
///
/// # Examples
///
/// ```
/// use menace::adapters::InMemoryRepository;
/// use menace::app::EngineConfig;
/// use menace::menace::MenaceEngine;
/// use menace::ports::SnapshotRepository;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let engine = MenaceEngine::new(EngineConfig::default())?;
///
/// repo.save(&engine.export_state(), Path::new("checkpoint"))?;
/// let loaded = repo.load(Path::new("checkpoint"))?;
/// assert_eq!(loaded.games_played, 0);
/// # Ok::<(), menace::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots currently stored
    pub fn count(&self) -> usize {
        lock(&self.storage).len()
    }

    pub fn clear(&self) {
        lock(&self.storage).clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        lock(&self.storage).contains_key(&key(path))
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl SnapshotRepository for InMemoryRepository {
    fn save(&self, snapshot: &EngineSnapshot, path: &Path) -> Result<()> {
        let bytes =
            rmp_serde::to_vec_named(snapshot).map_err(|e| Error::SerializationContext {
                operation: "serialize snapshot for in-memory storage".to_string(),
                message: e.to_string(),
            })?;

        lock(&self.storage).insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<EngineSnapshot> {
        let storage = lock(&self.storage);
        let bytes = storage.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load snapshot from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize snapshot from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::EngineConfig, menace::MenaceEngine};

    fn snapshot() -> EngineSnapshot {
        MenaceEngine::new(EngineConfig::default())
            .unwrap()
            .export_state()
    }

    #[test]
    fn save_and_load() {
        let repo = InMemoryRepository::new();
        let path = Path::new("checkpoint");
        assert!(!repo.contains(path));

        repo.save(&snapshot(), path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));
        assert_eq!(repo.load(path).unwrap(), snapshot());
    }

    #[test]
    fn load_nonexistent_returns_error() {
        let repo = InMemoryRepository::new();
        let err = repo.load(Path::new("nonexistent")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
    }

    #[test]
    fn clones_share_storage() {
        let first = InMemoryRepository::new();
        let second = first.clone();

        first.save(&snapshot(), Path::new("a")).unwrap();
        first.save(&snapshot(), Path::new("b")).unwrap();
        assert_eq!(second.count(), 2);

        second.clear();
        assert_eq!(first.count(), 0);
    }
}
