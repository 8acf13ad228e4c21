//! # notes-core
//!
//! Core types, traits, and abstractions for the notes service.
//!
//! This crate holds the `Note` entity with its validation and merge rules,
//! the error taxonomy, and the `NoteStore` capability trait that every
//! persistence backend implements.

pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
