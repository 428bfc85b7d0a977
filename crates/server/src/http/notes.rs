//! Note editor routes.

use axum::{
    Form, Json,
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};
use cairn_core::{Note, NoteSubmission};

use super::authenticate;
use crate::error::ApiError;
use crate::state::AppState;

fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Where a saved note is shown.
pub fn note_path(owner_id: &str, id: &str) -> String {
    format!("/users/{}/notes/{}", segment(owner_id), segment(id))
}

/// `POST /notes`: save the editor form and redirect to the note.
pub async fn upsert(
    State(state): State<AppState>, headers: HeaderMap, Form(submission): Form<NoteSubmission>,
) -> Result<Redirect, ApiError> {
    let principal = authenticate(&state, &headers)?;
    let note = state.upsert_note(&principal, submission).await?;
    Ok(Redirect::to(&note_path(&note.owner_id, &note.id)))
}

pub async fn view(
    State(state): State<AppState>, headers: HeaderMap, Path((owner_id, id)): Path<(String, String)>,
) -> Result<Json<Note>, ApiError> {
    let principal = authenticate(&state, &headers)?;
    Ok(Json(state.view_note(&principal, &owner_id, &id).await?))
}

pub async fn list(
    State(state): State<AppState>, headers: HeaderMap, Path(owner_id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let principal = authenticate(&state, &headers)?;
    Ok(Json(state.view_notes(&principal, &owner_id).await?))
}
