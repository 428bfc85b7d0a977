//! Note use-cases.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use super::model::{Note, NoteSubmission};
use super::validation::validate;
use crate::{Database, Error};

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("no note with id `{id}`"))
}

impl Database {
    /// Create or update a note on behalf of `owner_id`.
    ///
    /// Without an id a new note is created under a fresh UUID. With an id the
    /// note is updated in place; id and owner never change.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` when title or content is empty or too long
    /// - `Error::NotFound` when the id names no note owned by `owner_id`
    pub async fn upsert_note(&self, owner_id: &str, submission: NoteSubmission) -> Result<Note, Error> {
        let valid = validate(submission).map_err(|rejected| Error::Validation(Box::new(rejected)))?;
        let now = timestamp();

        match valid.id {
            Some(id) => {
                let note = self
                    .note_update(&id, owner_id, &valid.title, &valid.content, &now)
                    .await?
                    .ok_or_else(|| not_found(&id))?;
                tracing::info!(note_id = %note.id, owner_id, "updated note");
                Ok(note)
            }
            None => {
                let note = Note {
                    id: Uuid::new_v4().to_string(),
                    title: valid.title,
                    content: valid.content,
                    owner_id: owner_id.to_string(),
                    created_at: now.clone(),
                    updated_at: now,
                };
                self.note_insert(&note).await?;
                tracing::info!(note_id = %note.id, owner_id, "created note");
                Ok(note)
            }
        }
    }

    /// Fetch a note owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the note is missing or owned by someone else.
    pub async fn get_note(&self, id: &str, owner_id: &str) -> Result<Note, Error> {
        self.note_find(id, owner_id).await?.ok_or_else(|| not_found(id))
    }

    /// Every note owned by `owner_id`, most recently updated first.
    pub async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, Error> {
        self.note_list(owner_id).await
    }
}
