//! Application layer: configuration and the dependency injection container.
//!
//! ```text
//! App ──owns──▶ SnapshotRepository (MsgPack / JSON / in-memory)
//!  │
//!  └─builds──▶ Arc<MenaceEngine> ──shared by──▶ SessionRegistry, training
//! ```

pub mod config;
pub mod container;

pub use config::EngineConfig;
pub use container::{App, AppBuilder};
