//! Backend selection and dispatch.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{MemoryCache, PersistentCache};
use crate::Error;

/// Which cache a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// SQLite-backed store.
    Persistent,
    /// Bounded in-process LRU.
    Memory,
}

impl CacheBackend {
    pub const ALL: [CacheBackend; 2] = [CacheBackend::Persistent, CacheBackend::Memory];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheBackend::Persistent => "persistent",
            CacheBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persistent" => Ok(CacheBackend::Persistent),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(Error::InvalidBackend(other.to_string())),
        }
    }
}

/// Key-level admin operations every backend supports.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Up to `limit` keys in the backend's stable order.
    async fn list(&self, limit: usize) -> Result<Vec<String>, Error>;

    /// Up to `limit` keys containing `query`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, Error>;

    /// Remove `key`. Returns whether an entry was present; absence is not an error.
    async fn delete(&self, key: &str) -> Result<bool, Error>;
}

/// Both cache backends of one instance.
#[derive(Clone)]
pub struct CacheStores {
    pub persistent: PersistentCache,
    pub memory: Arc<MemoryCache>,
}

impl CacheStores {
    pub fn new(persistent: PersistentCache, memory: MemoryCache) -> Self {
        Self { persistent, memory: Arc::new(memory) }
    }

    /// The store behind `backend`.
    pub fn store(&self, backend: CacheBackend) -> &dyn KeyStore {
        match backend {
            CacheBackend::Persistent => &self.persistent,
            CacheBackend::Memory => self.memory.as_ref(),
        }
    }
}
