//! Operations shared by the HTTP routes and the MCP tools.
//!
//! Cache admin calls are resolved against the instance directory first: the
//! local node answers from its own stores, a peer is health-checked and then
//! asked to answer for itself. Note reads are memoised; every upsert drops the
//! memo entries it could have made stale.

use cairn_core::cache::CacheEntry;
use cairn_core::{
    CacheBackend, CacheListRequest, CacheListResult, Error, InstanceTarget, Note, NoteSubmission, Principal,
};

use crate::state::AppState;

/// Lifetime of a memoised note list.
const NOTE_LIST_TTL_MS: u64 = 60_000;

/// Memory cache key of a single note view.
pub fn note_view_key(owner_id: &str, id: &str) -> String {
    format!("note:{owner_id}:{id}")
}

/// Persistent cache key of an owner's note list.
pub fn note_list_key(owner_id: &str) -> String {
    format!("notes:{owner_id}")
}

impl AppState {
    /// List cache keys on `instance` (`None` means this node).
    pub async fn list_cache_keys(
        &self, principal: &Principal, instance: Option<&str>, request: &CacheListRequest, authorization: Option<&str>,
    ) -> Result<CacheListResult, Error> {
        principal.require_admin()?;
        match self.directory.resolve(instance)? {
            InstanceTarget::Local => self.caches.list_keys(request).await,
            InstanceTarget::Remote { id, base_url } => {
                self.peers.ping(&base_url).await?;
                let auth = self.forward_authorization(authorization);
                Ok(self.peers.list_keys(&base_url, &id, request, auth).await?)
            }
        }
    }

    /// Delete `key` from `backend` on `instance`.
    pub async fn delete_cache_key(
        &self, principal: &Principal, instance: Option<&str>, key: &str, backend: &str, authorization: Option<&str>,
    ) -> Result<(), Error> {
        principal.require_admin()?;
        let backend: CacheBackend = backend.parse()?;
        match self.directory.resolve(instance)? {
            InstanceTarget::Local => self.caches.delete_key(key, backend).await,
            InstanceTarget::Remote { id, base_url } => {
                self.peers.ping(&base_url).await?;
                let auth = self.forward_authorization(authorization);
                Ok(self.peers.delete_key(&base_url, &id, key, backend, auth).await?)
            }
        }
    }

    /// Create or update a note for `principal` and drop the memo entries it affects.
    pub async fn upsert_note(&self, principal: &Principal, submission: NoteSubmission) -> Result<Note, Error> {
        let note = self.db.upsert_note(&principal.user_id, submission).await?;
        self.caches.memory.remove(&note_view_key(&note.owner_id, &note.id));
        self.db.cache_delete(&note_list_key(&note.owner_id)).await?;
        Ok(note)
    }

    /// One note of `owner_id`, as seen by `principal`.
    ///
    /// Another user's notes are reported as missing, same as absent ones.
    pub async fn view_note(&self, principal: &Principal, owner_id: &str, id: &str) -> Result<Note, Error> {
        if principal.user_id != owner_id {
            return Err(Error::NotFound(format!("no note with id `{id}`")));
        }

        let key = note_view_key(owner_id, id);
        let memo = self.caches.memory.get(&key);
        if let Some(note) = memo.and_then(|entry| serde_json::from_value::<Note>(entry.value).ok()) {
            return Ok(note);
        }

        let note = self.db.get_note(id, owner_id).await?;
        self.caches
            .memory
            .set(&key, CacheEntry::new(serde_json::to_value(&note)?, None));
        Ok(note)
    }

    /// Every note of `owner_id`, as seen by `principal`.
    pub async fn view_notes(&self, principal: &Principal, owner_id: &str) -> Result<Vec<Note>, Error> {
        if principal.user_id != owner_id {
            return Ok(Vec::new());
        }

        let key = note_list_key(owner_id);
        let memo = self.caches.persistent.get(&key).await?;
        if let Some(notes) = memo.and_then(|entry| serde_json::from_value::<Vec<Note>>(entry.value).ok()) {
            return Ok(notes);
        }

        let notes = self.db.list_notes(owner_id).await?;
        let entry = CacheEntry::new(serde_json::to_value(&notes)?, Some(NOTE_LIST_TTL_MS));
        self.caches.persistent.set(&key, &entry).await?;
        self.persistent_written();
        Ok(notes)
    }
}
