//! Cache admin MCP tools.
//!
//! Both tools address an instance by id and act on its persistent and
//! in-memory backends.

pub mod delete;
pub mod list;

pub use delete::{CacheDeleteParams, delete_impl};
pub use list::{CacheListParams, list_impl};
