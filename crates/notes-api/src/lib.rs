//! # notes-api
//!
//! HTTP API server for the notes service: the note service layer, axum
//! handlers, router assembly, and environment configuration. The binary in
//! `main.rs` wires these to a listener.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

pub use app::build_router;
pub use config::{Config, StoreConfig, StoreKind};
pub use error::ApiError;
pub use services::NoteService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
}

impl AppState {
    pub fn new(notes: NoteService) -> Self {
        Self { notes }
    }
}
