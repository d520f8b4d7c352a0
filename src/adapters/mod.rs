//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits in [`crate::ports`].

pub mod in_memory_repository;
pub mod json_repository;
pub mod msgpack_repository;

pub use in_memory_repository::InMemoryRepository;
pub use json_repository::JsonRepository;
pub use msgpack_repository::MsgPackRepository;
