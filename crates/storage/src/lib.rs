#![forbid(unsafe_code)]

pub mod keys;
pub mod repository;

pub use repository::{InMemoryStore, KeyValueStore, Snapshot, StorageError, load_json, save_json};
