//! SQLite-backed cache operations.
//!
//! Values and metadata are stored as JSON text in the `cache` table.
//! Listing order is insertion order (rowid), which upserts preserve.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::backend::KeyStore;
use super::entry::{CacheEntry, CacheMetadata};
use crate::{Database, Error};

impl Database {
    /// Get a cached entry by key.
    ///
    /// Returns None if the key is absent or its TTL has elapsed.
    pub async fn cache_get(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let key = key.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String)>, Error> {
                let result = conn.query_row("SELECT value, metadata FROM cache WHERE key = ?1", params![key], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                });

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((value, metadata)) = row else { return Ok(None) };
        let entry = CacheEntry { value: serde_json::from_str(&value)?, metadata: serde_json::from_str(&metadata)? };

        if entry.metadata.is_expired() { Ok(None) } else { Ok(Some(entry)) }
    }

    /// Insert or replace a cached entry.
    pub async fn cache_set(&self, key: &str, entry: &CacheEntry) -> Result<(), Error> {
        let key = key.to_string();
        let value = serde_json::to_string(&entry.value)?;
        let metadata = serde_json::to_string(&entry.metadata)?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache (key, value, metadata) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        metadata = excluded.metadata",
                    params![key, value, metadata],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Up to `limit` unexpired keys in insertion order.
    pub async fn cache_keys(&self, limit: usize) -> Result<Vec<String>, Error> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT key, metadata FROM cache ORDER BY rowid")?;
                live_keys(&mut stmt, [], now, limit)
            })
            .await
            .map_err(Error::from)
    }

    /// Up to `limit` unexpired keys containing `query` (case-sensitive), in insertion order.
    pub async fn cache_search_keys(&self, query: &str, limit: usize) -> Result<Vec<String>, Error> {
        let query = query.to_string();
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT key, metadata FROM cache WHERE instr(key, ?1) > 0 ORDER BY rowid")?;
                live_keys(&mut stmt, params![query], now, limit)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a cached entry. Returns whether a row was removed.
    pub async fn cache_delete(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache WHERE key = ?1", params![key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry whose TTL has elapsed.
    ///
    /// Returns the number of deleted entries.
    pub async fn cache_purge_expired(&self) -> Result<u64, Error> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let mut stmt = conn.prepare("SELECT key, metadata FROM cache")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                let expired = rows
                    .into_iter()
                    .filter(|(_, metadata)| {
                        serde_json::from_str::<CacheMetadata>(metadata).is_ok_and(|m| m.is_expired_at(now))
                    })
                    .map(|(key, _)| key)
                    .collect::<Vec<_>>();

                let mut deleted = 0u64;
                for key in expired {
                    deleted += conn.execute("DELETE FROM cache WHERE key = ?1", params![key])? as u64;
                }
                Ok(deleted)
            })
            .await
            .map_err(Error::from)
    }
}

/// Keys of `(key, metadata)` rows still alive at `now_ms`, up to `limit`.
fn live_keys(
    stmt: &mut rusqlite::Statement<'_>, params: impl rusqlite::Params, now_ms: i64, limit: usize,
) -> Result<Vec<String>, Error> {
    let mut rows = stmt.query(params)?;
    let mut keys = Vec::new();
    while keys.len() < limit {
        let Some(row) = rows.next()? else { break };
        let metadata: String = row.get(1)?;
        if !serde_json::from_str::<CacheMetadata>(&metadata)?.is_expired_at(now_ms) {
            keys.push(row.get(0)?);
        }
    }
    Ok(keys)
}

/// The persistent backend as a [`KeyStore`].
#[derive(Clone, Debug)]
pub struct PersistentCache {
    db: Database,
}

impl PersistentCache {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        self.db.cache_get(key).await
    }

    pub async fn set(&self, key: &str, entry: &CacheEntry) -> Result<(), Error> {
        self.db.cache_set(key, entry).await
    }
}

#[async_trait]
impl KeyStore for PersistentCache {
    async fn list(&self, limit: usize) -> Result<Vec<String>, Error> {
        self.db.cache_keys(limit).await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, Error> {
        self.db.cache_search_keys(query, limit).await
    }

    async fn delete(&self, key: &str) -> Result<bool, Error> {
        self.db.cache_delete(key).await
    }
}
