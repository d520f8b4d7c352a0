//! JSON implementation of the snapshot repository.
//!
//! Produces a human-readable file that other tools can consume: matchboxes are
//! keyed by their canonical board text and bead maps by position.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, menace::EngineSnapshot, ports::SnapshotRepository};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepository {
    pretty: bool,
}

impl JsonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl SnapshotRepository for JsonRepository {
    fn save(&self, snapshot: &EngineSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
        } else {
            serde_json::to_writer(&mut writer, snapshot)?;
        }
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush file {path:?}"),
            source,
        })?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<EngineSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
