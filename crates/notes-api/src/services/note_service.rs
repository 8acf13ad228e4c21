//! Service for note CRUD on top of a [`NoteStore`].
//!
//! The service owns the rules that must hold no matter which backend is
//! configured:
//!
//! - create validates title and content, then allocates id and timestamps
//! - update merges only the supplied fields and always moves `updatedAt`
//! - listing uses one canonical order (most recently updated first)
//! - a missing id is `None`/`false`/`NotFound`, never a store error

use std::sync::Arc;
use std::time::Instant;

use notes_core::{
    now_millis, sort_by_recency, CreateNoteRequest, Error, Note, NoteStore, Result,
    UpdateNoteRequest,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a store liveness probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub backend: &'static str,
}

/// Note CRUD orchestration. Cheap to clone; the store is shared.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// All notes, most recently updated first.
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let start = Instant::now();
        let mut notes = self.store.read_all().await?;
        sort_by_recency(&mut notes);

        debug!(
            subsystem = "service",
            op = "list",
            backend = self.backend(),
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed notes"
        );
        Ok(notes)
    }

    /// Fetch one note. `None` when the id is unknown.
    pub async fn get_note(&self, id: Uuid) -> Result<Option<Note>> {
        self.store.fetch(id).await
    }

    /// Validate and persist a new note.
    pub async fn create_note(&self, req: CreateNoteRequest) -> Result<Note> {
        let note = Note::new(req)?;
        self.store.insert(&note).await?;

        info!(
            subsystem = "service",
            op = "create",
            note_id = %note.id,
            backend = self.backend(),
            "Note created"
        );
        Ok(note)
    }

    /// Merge `req` into the stored note and persist it.
    ///
    /// The merge runs inside the store, so concurrent partial updates to the
    /// same note do not overwrite each other. Returns `NotFound` if the id is
    /// unknown or the note is deleted first.
    pub async fn update_note(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        req.validate()?;
        let note = self
            .store
            .update(id, &req, now_millis())
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(
            subsystem = "service",
            op = "update",
            note_id = %id,
            backend = self.backend(),
            "Note updated"
        );
        Ok(note)
    }

    /// Remove a note. Returns whether it existed.
    pub async fn delete_note(&self, id: Uuid) -> Result<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(subsystem = "service", op = "delete", note_id = %id, "Note deleted");
        }
        Ok(deleted)
    }

    /// Probe the store. Failures are logged and reported, not returned.
    pub async fn check_health(&self) -> HealthStatus {
        let healthy = match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    subsystem = "service",
                    op = "ping",
                    backend = self.backend(),
                    error = %e,
                    "Store health probe failed"
                );
                false
            }
        };
        HealthStatus {
            healthy,
            backend: self.backend(),
        }
    }
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Note {} not found", id))
}
