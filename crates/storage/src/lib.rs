#![forbid(unsafe_code)]

pub mod file;
pub mod progress_store;
pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use file::JsonFileStore;
pub use progress_store::{PROGRESS_KEY, ProgressStore};
pub use repository::{InMemoryStore, KeyValueStore, StorageError};
pub use sqlite::{SqliteInitError, SqliteStore};
