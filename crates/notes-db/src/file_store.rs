//! JSON file store.
//!
//! The whole note set lives in one pretty-printed JSON array. Every mutation
//! rewrites the file through a sibling temp file and an atomic `rename`, so a
//! reader sees either the old set or the new one. Read-modify-write cycles are
//! serialized behind a single writer lock.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use notes_core::{duplicate_id, ensure_unique_ids, Note, NoteStore, Result, UpdateNoteRequest};

/// File-backed implementation of [`NoteStore`].
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing touches the disk until first access; the file and its parent
    /// directories are created then.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "notes.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read and parse the file. `None` when it does not exist yet.
    async fn read_file(&self) -> Result<Option<Vec<Note>>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }
        let notes: Vec<Note> = serde_json::from_str(&raw)?;
        Ok(Some(notes))
    }

    /// Write the full set via temp file + rename. Caller holds `write_lock`.
    async fn persist(&self, notes: &[Note]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(notes)?;
        let tmp = self.temp_path();
        fs::write(&tmp, &body).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(
            subsystem = "file_store",
            op = "persist",
            path = %self.path.display(),
            result_count = notes.len(),
            bytes = body.len(),
            "Notes file written"
        );
        Ok(())
    }

    /// Load the current set while holding the writer lock, creating an
    /// empty file if none exists.
    async fn load_locked(&self) -> Result<Vec<Note>> {
        match self.read_file().await? {
            Some(notes) => Ok(notes),
            None => {
                self.persist(&[]).await?;
                info!(
                    subsystem = "file_store",
                    op = "initialize",
                    path = %self.path.display(),
                    "Created empty notes file"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Run a read-modify-write cycle under the writer lock.
    ///
    /// `f` returns the value to hand back plus whether the set changed;
    /// the file is rewritten only when it did. An error from `f` leaves the
    /// file untouched.
    async fn mutate<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Note>) -> Result<(T, bool)> + Send,
        T: Send,
    {
        let start = Instant::now();
        let _guard = self.write_lock.lock().await;
        let mut notes = self.load_locked().await?;
        let (value, changed) = f(&mut notes)?;
        if changed {
            self.persist(&notes).await?;
        }

        debug!(
            subsystem = "file_store",
            op,
            changed,
            duration_ms = start.elapsed().as_millis() as u64,
            "File store mutation"
        );
        Ok(value)
    }
}

#[async_trait]
impl NoteStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn read_all(&self) -> Result<Vec<Note>> {
        if let Some(notes) = self.read_file().await? {
            return Ok(notes);
        }
        let _guard = self.write_lock.lock().await;
        self.load_locked().await
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        let notes = self.read_all().await?;
        Ok(notes.into_iter().find(|n| n.id == id))
    }

    async fn insert(&self, note: &Note) -> Result<()> {
        let note = note.clone();
        self.mutate("insert", move |notes| {
            if notes.iter().any(|n| n.id == note.id) {
                return Err(duplicate_id(note.id));
            }
            notes.push(note);
            Ok(((), true))
        })
        .await
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateNoteRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Note>> {
        self.mutate("update", move |notes| {
            match notes.iter_mut().find(|n| n.id == id) {
                Some(slot) => {
                    slot.apply_update(changes, now)?;
                    Ok((Some(slot.clone()), true))
                }
                None => Ok((None, false)),
            }
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        self.mutate("delete", move |notes| {
            let before = notes.len();
            notes.retain(|n| n.id != id);
            let removed = notes.len() < before;
            Ok((removed, removed))
        })
        .await
    }

    async fn write_all(&self, notes: &[Note]) -> Result<()> {
        ensure_unique_ids(notes)?;
        let _guard = self.write_lock.lock().await;
        self.persist(notes).await
    }

    async fn ping(&self) -> Result<()> {
        self.read_all().await.map(|_| ())
    }
}
