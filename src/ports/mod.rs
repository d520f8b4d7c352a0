//! Ports (trait boundaries) for external dependencies.
//!
//! The engine owns these traits; adapters in [`crate::adapters`] implement them.

pub mod repository;

pub use repository::SnapshotRepository;
