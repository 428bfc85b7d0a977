//! Cached values and their freshness metadata.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Metadata stored next to every cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// Milliseconds since the Unix epoch at write time.
    pub created_time: i64,
    /// Time to live in milliseconds; `None` never expires.
    pub ttl_ms: Option<u64>,
}

impl CacheMetadata {
    /// Metadata for a value written now.
    pub fn now(ttl_ms: Option<u64>) -> Self {
        Self { created_time: Utc::now().timestamp_millis(), ttl_ms }
    }

    /// Whether the value has outlived its TTL at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.ttl_ms {
            Some(ttl) => self.created_time.saturating_add(ttl as i64) <= now_ms,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }
}

/// A cached JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub metadata: CacheMetadata,
}

impl CacheEntry {
    pub fn new(value: serde_json::Value, ttl_ms: Option<u64>) -> Self {
        Self { value, metadata: CacheMetadata::now(ttl_ms) }
    }
}
