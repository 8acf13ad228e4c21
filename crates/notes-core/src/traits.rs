//! Core traits for note persistence.
//!
//! `NoteStore` is the single capability interface every backend satisfies,
//! so the service layer behaves identically over a JSON file, a SQL table,
//! or an in-memory fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Note, UpdateNoteRequest};

/// Persistence backend for notes.
///
/// Implementations must keep mutations atomic from the caller's point of
/// view: a concurrent `read_all` never observes a half-written set.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Short backend name used in logs and the health report.
    fn backend(&self) -> &'static str;

    /// Read every note. An empty or not-yet-initialized store yields an
    /// empty vector, never an error.
    async fn read_all(&self) -> Result<Vec<Note>>;

    /// Fetch one note by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<Note>>;

    /// Persist a new note. An id that is already stored is `Error::Conflict`.
    async fn insert(&self, note: &Note) -> Result<()>;

    /// Merge `changes` into the stored note and return the result, or `None`
    /// if the id is absent.
    ///
    /// The read, merge, and write happen as one step with respect to other
    /// mutations of the same store, so concurrent partial updates to one note
    /// all survive. `updated_at` becomes `now`, or one millisecond past the
    /// stored value if that is later (see [`Note::apply_update`]).
    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateNoteRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Note>>;

    /// Remove a note. Returns `false` if absent.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Replace the full set of notes in one atomic step. A set with duplicate
    /// ids is rejected with `Error::Conflict` and leaves the store unchanged.
    async fn write_all(&self, notes: &[Note]) -> Result<()>;

    /// Trivial liveness probe against the underlying storage.
    async fn ping(&self) -> Result<()>;
}
