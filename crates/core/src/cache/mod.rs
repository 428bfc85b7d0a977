//! Cache backends and the admin contract over them.
//!
//! Two independent key spaces exist side by side:
//!
//! - `persistent`: rows in the SQLite `cache` table, surviving restarts
//! - `memory`: a bounded in-process LRU
//!
//! The same key string may live in both without any relation between the
//! two entries. Admin operations (list, search, delete) dispatch on
//! [`CacheBackend`] through the [`KeyStore`] trait.

pub mod admin;
pub mod backend;
pub mod entry;
pub mod memory;
pub mod persistent;

pub use admin::{CacheListRequest, CacheListResult, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use backend::{CacheBackend, CacheStores, KeyStore};
pub use entry::{CacheEntry, CacheMetadata};
pub use memory::MemoryCache;
pub use persistent::PersistentCache;
