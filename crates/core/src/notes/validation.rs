//! Field validation for note submissions.

use super::model::{FieldErrors, NoteSubmission, Rejected};

pub const TITLE_MAX_LENGTH: usize = 100;
pub const CONTENT_MAX_LENGTH: usize = 10_000;

/// A submission that passed validation, with trimmed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidNote {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
}

fn check(errors: &mut FieldErrors, field: &str, label: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len == 0 {
        errors.push(field, format!("{label} is required"));
    } else if len > max {
        errors.push(field, format!("{label} must be at most {max} characters"));
    }
}

/// Validate a submission.
///
/// Every field is checked so that the caller sees all problems at once.
///
/// # Errors
///
/// Returns the untouched submission with per-field messages when a field fails.
pub fn validate(submission: NoteSubmission) -> Result<ValidNote, Rejected> {
    let title = submission.title.trim();
    let content = submission.content.trim();

    let mut errors = FieldErrors::default();
    check(&mut errors, "title", "Title", title, TITLE_MAX_LENGTH);
    check(&mut errors, "content", "Content", content, CONTENT_MAX_LENGTH);

    if errors.is_empty() {
        Ok(ValidNote {
            id: submission.target_id().map(str::to_string),
            title: title.to_string(),
            content: content.to_string(),
        })
    } else {
        Err(Rejected { submission, errors })
    }
}
