//! Core types and shared functionality for cairn.
//!
//! This crate provides:
//! - SQLite store with embedded migrations
//! - Persistent and in-memory cache backends plus the admin contract over them
//! - Note upsert contract with field validation
//! - Instance directory and access principals
//! - Debounce and double-check interaction helpers
//! - Configuration and unified error types

pub mod access;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod instance;
pub mod interaction;
pub mod notes;

pub use access::Principal;
pub use cache::{CacheBackend, CacheListRequest, CacheListResult, CacheStores};
pub use db::Database;
pub use error::Error;
pub use instance::{InstanceDirectory, InstanceTarget};
pub use notes::{Note, NoteSubmission};
