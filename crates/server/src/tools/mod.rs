//! MCP tool implementations.
//!
//! This module contains all tools exposed by the cairn server.

pub mod cache;
pub mod note_upsert;
