//! In-memory note store, for tests and throwaway runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use notes_core::{duplicate_id, ensure_unique_ids, Note, NoteStore, Result, UpdateNoteRequest};

/// Vector-backed implementation of [`NoteStore`]. Insertion order is kept.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn read_all(&self) -> Result<Vec<Note>> {
        Ok(self.notes.read().await.clone())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self.notes.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn insert(&self, note: &Note) -> Result<()> {
        let mut notes = self.notes.write().await;
        if notes.iter().any(|n| n.id == note.id) {
            return Err(duplicate_id(note.id));
        }
        notes.push(note.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateNoteRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Note>> {
        let mut notes = self.notes.write().await;
        match notes.iter_mut().find(|n| n.id == id) {
            Some(slot) => {
                slot.apply_update(changes, now)?;
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        Ok(notes.len() < before)
    }

    async fn write_all(&self, notes: &[Note]) -> Result<()> {
        ensure_unique_ids(notes)?;
        *self.notes.write().await = notes.to_vec();
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
