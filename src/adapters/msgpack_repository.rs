//! MessagePack implementation of the snapshot repository.

use std::{fs::File, io::BufWriter, path::Path};

use crate::{Result, error::Error, menace::EngineSnapshot, ports::SnapshotRepository};

/// Compact binary snapshot files via `rmp_serde`.
///
/// # Examples
///
/// ```no_run
/// use menace::adapters::MsgPackRepository;
/// use menace::app::EngineConfig;
/// use menace::menace::MenaceEngine;
/// use menace::ports::SnapshotRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let engine = MenaceEngine::new(EngineConfig::default())?;
///
/// repo.save(&engine.export_state(), Path::new("trained.msgpack"))?;
/// let snapshot = repo.load(Path::new("trained.msgpack"))?;
/// engine.import_state(snapshot)?;
/// # Ok::<(), menace::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackRepository {
    fn save(&self, snapshot: &EngineSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write_named(&mut writer, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize snapshot to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        writer.into_inner().map_err(|e| Error::Io {
            operation: format!("flush file {path:?}"),
            source: e.into_error(),
        })?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<EngineSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        rmp_serde::decode::from_read(file).map_err(|e| Error::SerializationContext {
            operation: "deserialize snapshot from MessagePack".to_string(),
            message: e.to_string(),
        })
    }
}
