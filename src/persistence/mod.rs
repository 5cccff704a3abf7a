//! Persistence Layer
//!
//! The mock keeps everything in memory; state lives as long as the server
//! instance that owns it.

pub mod memory_store;

pub use memory_store::{InMemoryStore, MergeOutcome};
