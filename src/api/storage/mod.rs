//! Storage module for the API.
//!
//! Provides the in-memory and PostgreSQL storage backends plus a typed
//! repository on top of them.

pub mod error;
pub mod repository;
pub mod traits;

// Storage backend implementations
pub mod memory;
pub mod postgres;

pub use error::StorageError;
pub use memory::MemoryStorageBackend;
pub use postgres::PostgresStorageBackend;
pub use repository::Repository;
pub use traits::{RecordKind, StorageBackend, StoredRecord, UserContext};
