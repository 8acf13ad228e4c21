//! # notes-db
//!
//! Persistence backends for the notes service.
//!
//! This crate provides:
//! - `JsonFileStore`: the whole note set in one JSON file, rewritten atomically
//! - `PgNoteStore`: one row per note in a PostgreSQL `notes` table
//! - `InMemoryNoteStore`: a vector behind a lock, for tests
//! - Connection settings and pool management for PostgreSQL
//!
//! ## Example
//!
//! ```rust,ignore
//! use notes_db::{JsonFileStore, NoteStore, Note, CreateNoteRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = JsonFileStore::new("data/notes.json");
//!     let note = Note::new(CreateNoteRequest::new("Hello", "world"))?;
//!     store.insert(&note).await?;
//!     println!("Stored {} notes", store.read_all().await?.len());
//!     Ok(())
//! }
//! ```

pub mod file_store;
pub mod memory_store;
pub mod pg_store;
pub mod pool;

// Re-export core types
pub use notes_core::*;

pub use file_store::JsonFileStore;
pub use memory_store::InMemoryNoteStore;
pub use pg_store::PgNoteStore;
pub use pool::{
    create_pool, create_pool_with_config, log_pool_metrics, DatabaseSettings, PoolConfig,
};
