//! Note HTTP handlers.
//!
//! Thin adapters between JSON bodies and [`NoteService`](crate::services::NoteService):
//! they parse ids, apply the presence checks, and map outcomes to status codes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use notes_core::{CreateNoteRequest, Note, UpdateNoteRequest};

use crate::{ApiError, AppState};

/// Body accepted by create and update. Both fields are optional at the
/// parsing stage; presence rules are enforced per operation.
#[derive(Debug, Default, Deserialize)]
pub struct NoteBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Ids are opaque to clients; one that does not parse cannot exist.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| note_not_found(raw))
}

fn note_not_found(id: impl std::fmt::Display) -> ApiError {
    ApiError::NotFound(format!("Note {} not found", id))
}

/// List all notes, most recently updated first.
///
/// # Returns
/// - 200 OK with an array of notes
/// - 500 Internal Server Error if the store fails
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.notes.list_notes().await?;
    Ok(Json(notes))
}

/// Get a note by id.
///
/// # Returns
/// - 200 OK with the note
/// - 404 Not Found if no note has this id
/// - 500 Internal Server Error if the store fails
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    state
        .notes
        .get_note(id)
        .await?
        .map(Json)
        .ok_or_else(|| note_not_found(id))
}

/// Create a note.
///
/// # Returns
/// - 201 Created with the new note
/// - 400 Bad Request if title or content is missing or blank
/// - 500 Internal Server Error if the store fails
pub async fn create_note(
    State(state): State<AppState>,
    body: Result<Json<NoteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(body) = body?;
    let req = CreateNoteRequest {
        title: body.title.unwrap_or_default(),
        content: body.content.unwrap_or_default(),
    };
    let note = state.notes.create_note(req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Update a note's title and/or content.
///
/// Empty strings count as "not supplied", so a client may send the field it
/// is not changing as `""`.
///
/// # Returns
/// - 200 OK with the updated note
/// - 400 Bad Request if neither title nor content is supplied
/// - 404 Not Found if no note has this id
/// - 500 Internal Server Error if the store fails
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<NoteBody>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(body) = body?;
    let req = UpdateNoteRequest {
        title: body.title.filter(|t| !t.trim().is_empty()),
        content: body.content.filter(|c| !c.trim().is_empty()),
    };
    if req.is_empty() {
        return Err(ApiError::BadRequest(
            "At least title or content is required for update".to_string(),
        ));
    }

    let id = parse_note_id(&id)?;
    let note = state.notes.update_note(id, req).await?;
    Ok(Json(note))
}

/// Delete a note.
///
/// # Returns
/// - 204 No Content on success
/// - 404 Not Found if no note has this id
/// - 500 Internal Server Error if the store fails
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_note_id(&id)?;
    if state.notes.delete_note(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(note_not_found(id))
    }
}
