//! Dependency injection container for the MENACE application.
//!
//! The container owns the snapshot repository and builds shared engines and
//! session registries from an [`EngineConfig`].

use std::{io, path::Path, sync::Arc};

use super::config::EngineConfig;
use crate::{
    Error, Result, adapters::MsgPackRepository, menace::MenaceEngine, ports::SnapshotRepository,
    session::SessionRegistry,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ```
/// use menace::app::{App, EngineConfig};
///
/// let app = App::new();
/// let engine = app.create_engine(EngineConfig::new().with_seed(42))?;
/// let registry = app.create_registry(engine);
/// assert!(registry.is_empty());
/// # Ok::<(), menace::Error>(())
/// ```
///
/// Tests swap in an in-memory repository:
///
/// ```
/// use menace::app::App;
/// use menace::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    repository: Arc<dyn SnapshotRepository + Send + Sync>,
    /// Seed used when a config carries none (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create an app that stores snapshots as MessagePack files.
    pub fn new() -> Self {
        Self {
            repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn repository(&self) -> Arc<dyn SnapshotRepository + Send + Sync> {
        Arc::clone(&self.repository)
    }

    fn seeded(&self, config: EngineConfig) -> EngineConfig {
        match (config.seed, self.default_seed) {
            (None, Some(seed)) => config.with_seed(seed),
            _ => config,
        }
    }

    /// Create an engine with an empty store.
    pub fn create_engine(&self, config: EngineConfig) -> Result<Arc<MenaceEngine>> {
        Ok(Arc::new(MenaceEngine::new(self.seeded(config))?))
    }

    /// Load an engine from a saved snapshot.
    ///
    /// The snapshot's bead parameters replace those in `config`; seed and shard
    /// count are taken from `config`.
    ///
    /// ```no_run
    /// use menace::app::{App, EngineConfig};
    /// use std::path::Path;
    ///
    /// let app = App::new();
    /// let engine = app.load_engine(EngineConfig::default(), Path::new("trained.msgpack"))?;
    /// # Ok::<(), menace::Error>(())
    /// ```
    pub fn load_engine(&self, config: EngineConfig, path: &Path) -> Result<Arc<MenaceEngine>> {
        let snapshot = self.repository.load(path)?;
        let engine = MenaceEngine::from_snapshot(self.seeded(config), snapshot)?;
        log::info!("loaded engine state from {}", path.display());
        Ok(Arc::new(engine))
    }

    /// Create an engine, loading `path` when the repository has it and starting
    /// empty otherwise.
    pub fn open_engine(&self, config: EngineConfig, path: &Path) -> Result<Arc<MenaceEngine>> {
        match self.load_engine(config.clone(), path) {
            Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                log::info!("no saved state at {}, starting fresh", path.display());
                self.create_engine(config)
            }
            loaded => loaded,
        }
    }

    pub fn save_engine(&self, engine: &MenaceEngine, path: &Path) -> Result<()> {
        self.repository.save(&engine.export_state(), path)?;
        log::info!("saved engine state to {}", path.display());
        Ok(())
    }

    pub fn create_registry(&self, engine: Arc<MenaceEngine>) -> SessionRegistry {
        SessionRegistry::new(engine)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing an app with custom dependencies.
pub struct AppBuilder {
    repository: Option<Arc<dyn SnapshotRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            default_seed: None,
        }
    }

    pub fn with_repository<R: SnapshotRepository + Send + Sync + 'static>(
        mut self,
        repo: R,
    ) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    /// Seed applied to every engine whose config has none.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app. Without a repository, MessagePack files are used.
    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
