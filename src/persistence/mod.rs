//! Progress persistence
//!
//! A single JSON record under a versioned key in a key-value store:
//! - `store`: the store capability and an in-memory implementation
//! - `record`: tolerant load, full-overwrite save, change tracking

pub mod record;
pub mod store;

pub use record::{ProgressSaver, SaveRecord, encode_progress, load_progress, save_progress};
pub use store::{KeyValueStore, MemoryStore};
