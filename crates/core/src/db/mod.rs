//! SQLite store shared by the persistent cache and the note table.
//!
//! Access goes through tokio-rusqlite, which runs statements on a
//! dedicated background thread.

pub mod connection;
pub mod migrations;

pub use connection::Database;
