//! Notes owned by users.
//!
//! A note is created with a fresh id when the submission carries none and
//! updated in place when it does. Lookups are always scoped to the owner:
//! a note owned by someone else reads exactly like a missing one.

pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use model::{FieldErrors, Note, NoteSubmission, Rejected};
pub use validation::{CONTENT_MAX_LENGTH, TITLE_MAX_LENGTH, ValidNote, validate};
