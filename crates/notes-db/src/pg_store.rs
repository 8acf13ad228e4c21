//! PostgreSQL note store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use notes_core::{
    duplicate_id, ensure_unique_ids, Error, Note, NoteStore, Result, UpdateNoteRequest,
};

const SELECT_COLUMNS: &str = "SELECT id, title, content, created_at, updated_at FROM notes";

/// PostgreSQL implementation of [`NoteStore`].
///
/// Each insert, update, and delete is a single statement and relies on the
/// engine's per-statement atomicity. `write_all` runs in one transaction.
#[derive(Clone)]
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    /// Create a new PgNoteStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `notes` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notes (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_updated_at ON notes (updated_at DESC)")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        info!(subsystem = "db", component = "pg_store", op = "ensure_schema", "Notes table ready");
        Ok(())
    }
}

/// Translate a primary-key violation into the store-independent conflict error.
fn map_insert_error(id: Uuid, e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_id(id),
        _ => Error::Database(e),
    }
}

/// Map a database row to a Note.
fn map_row_to_note(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn read_all(&self) -> Result<Vec<Note>> {
        let query = format!(
            "{} ORDER BY updated_at DESC, created_at DESC, id ASC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "pg_store",
            op = "read_all",
            result_count = rows.len(),
            "Loaded notes"
        );
        Ok(rows.into_iter().map(map_row_to_note).collect())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        let query = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(map_row_to_note))
    }

    async fn insert(&self, note: &Note) -> Result<()> {
        sqlx::query(
            "INSERT INTO notes (id, title, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(note.id, e))?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateNoteRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Note>> {
        changes.validate()?;

        // Merge and timestamp floor in one statement.
        let row = sqlx::query(
            "UPDATE notes SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = GREATEST($4, updated_at + interval '1 millisecond')
             WHERE id = $1
             RETURNING id, title, content, created_at, updated_at",
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "pg_store",
            op = "update",
            note_id = %id,
            found = row.is_some(),
            "Note update applied"
        );
        Ok(row.map(map_row_to_note))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn write_all(&self, notes: &[Note]) -> Result<()> {
        ensure_unique_ids(notes)?;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM notes")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        for note in notes {
            sqlx::query(
                "INSERT INTO notes (id, title, content, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(note.id)
            .bind(&note.title)
            .bind(&note.content)
            .bind(note.created_at)
            .bind(note.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        crate::pool::log_pool_metrics(&self.pool);
        Ok(())
    }
}
