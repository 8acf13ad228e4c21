//! HTTP handler modules for notes-api.

pub mod health;
pub mod notes;

pub use health::{api_not_found, api_root, health_check};
pub use notes::{create_note, delete_note, get_note, list_notes, update_note};
