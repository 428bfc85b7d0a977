//! note_upsert tool implementation.
//!
//! Creates a note when no id is given, otherwise updates the caller's note
//! with that id. Rejected submissions come back as an invalid-params error
//! whose data holds the submission and the messages for each field.

use cairn_core::{Note, NoteSubmission, Principal};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::http::notes::note_path;
use crate::state::AppState;

/// Output from the note_upsert tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteUpsertOutput {
    pub note: Note,

    /// Path of the note page on the HTTP surface.
    pub location: String,
}

/// Implementation of the note_upsert tool.
pub async fn upsert_impl(
    state: &AppState, principal: &Principal, params: NoteSubmission,
) -> Result<CallToolResult, McpError> {
    let note = state.upsert_note(principal, params).await?;
    let output = NoteUpsertOutput { location: note_path(&note.owner_id, &note.id), note };
    let json = serde_json::to_string_pretty(&output).map_err(cairn_core::Error::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
