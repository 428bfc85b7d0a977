//! Listing and deleting cache keys across both backends.
//!
//! These run against the local instance only; callers resolve the
//! addressed instance first (see [`crate::instance`]).

use serde::{Deserialize, Serialize};

use super::backend::{CacheBackend, CacheStores};
use crate::Error;

/// Limit applied when the caller gives none.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Largest accepted limit.
pub const MAX_LIST_LIMIT: u32 = 10_000;

/// A normalized listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheListRequest {
    /// Substring filter. Never empty: a blank query is normalized to `None`.
    pub query: Option<String>,
    /// Per-backend cap, within `1..=MAX_LIST_LIMIT`.
    pub limit: u32,
}

impl Default for CacheListRequest {
    fn default() -> Self {
        Self { query: None, limit: DEFAULT_LIST_LIMIT }
    }
}

impl CacheListRequest {
    /// Build a request from raw query-string values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `limit` is not an integer in `1..=10000`.
    pub fn parse(query: Option<&str>, limit: Option<&str>) -> Result<Self, Error> {
        let limit = match limit.map(str::trim) {
            None | Some("") => DEFAULT_LIST_LIMIT,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| Error::InvalidInput(format!("limit must be an integer, got `{raw}`")))?,
        };
        Self::new(query.map(str::to_string), limit)
    }

    /// Build a request from typed values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `limit` is outside `1..=10000`.
    pub fn new(query: Option<String>, limit: u32) -> Result<Self, Error> {
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(Error::InvalidInput(format!("limit must be between 1 and {MAX_LIST_LIMIT}, got {limit}")));
        }
        Ok(Self { query: normalize_query(query), limit })
    }
}

/// Drop blank queries so that `?query=` or `?query=%20` behaves like no query at all.
pub fn normalize_query(query: Option<String>) -> Option<String> {
    query.filter(|q| !q.trim().is_empty())
}

/// Keys found in each backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheListResult {
    pub persistent_keys: Vec<String>,
    pub memory_keys: Vec<String>,
}

impl CacheListResult {
    pub fn keys(&self, backend: CacheBackend) -> &[String] {
        match backend {
            CacheBackend::Persistent => &self.persistent_keys,
            CacheBackend::Memory => &self.memory_keys,
        }
    }

    fn keys_mut(&mut self, backend: CacheBackend) -> &mut Vec<String> {
        match backend {
            CacheBackend::Persistent => &mut self.persistent_keys,
            CacheBackend::Memory => &mut self.memory_keys,
        }
    }
}

impl CacheStores {
    /// List (or search) up to `limit` keys from every backend.
    pub async fn list_keys(&self, request: &CacheListRequest) -> Result<CacheListResult, Error> {
        let limit = request.limit as usize;
        let mut result = CacheListResult::default();

        for backend in CacheBackend::ALL {
            let store = self.store(backend);
            let keys = match request.query.as_deref() {
                Some(query) => store.search(query, limit).await?,
                None => store.list(limit).await?,
            };
            *result.keys_mut(backend) = keys;
        }

        tracing::debug!(
            query = request.query.as_deref().unwrap_or(""),
            limit,
            persistent = result.persistent_keys.len(),
            memory = result.memory_keys.len(),
            "listed cache keys"
        );
        Ok(result)
    }

    /// Delete `key` from `backend`. Deleting an absent key succeeds.
    pub async fn delete_key(&self, key: &str, backend: CacheBackend) -> Result<(), Error> {
        let removed = self.store(backend).delete(key).await?;
        tracing::info!(key, %backend, removed, "deleted cache key");
        Ok(())
    }
}
