#![forbid(unsafe_code)]

//! Core domain model and persistence for the fitness journal.
//!
//! This crate provides:
//! - Domain types (workouts, segments, sets, exercises, weights)
//! - The in-memory workout store with referential-integrity enforcement
//! - Versioned JSON document codec (backward-compatible decode)
//! - File-backed persistence with atomic whole-document rewrites
//! - CSV export

pub mod types;
pub mod error;
pub mod codec;
pub mod config;
pub mod logging;
pub mod persistor;
pub mod store;
pub mod export;
pub mod samples;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use codec::{DataWrapper, DecodeContext, CURRENT_SCHEMA_VERSION, OLDEST_SCHEMA_VERSION};
pub use config::Config;
pub use persistor::{FilePersistor, JournalFileIo, StdFileIo};
pub use store::{MemoryPersistor, PersistorEvent, WorkoutStore, WorkoutStorePersistor};
pub use export::export_sets_csv;
