//! In-memory revocation store
//!
//! Backs unit tests and single-process deployments. Expired entries are
//! dropped lazily on lookup and eagerly by [`purge_expired`].
//!
//! [`purge_expired`]: crate::repositories::revocation::RevocationStore::purge_expired

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::r#trait::RevocationStore;
use crate::domain::entities::revocation::{RevocationEntry, RevocationId};
use crate::errors::DomainResult;

/// Revocation store holding entries in process memory
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<String, RevocationEntry>,
}

impl MemoryRevocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including any not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Clones the entry out before touching the map again; removing while
    // a read guard is held would deadlock.
    fn live_entry(&self, key: &str) -> Option<RevocationEntry> {
        let entry = self.entries.get(key).map(|e| e.clone())?;
        if entry.is_expired(Utc::now()) {
            self.entries.remove(key);
            return None;
        }
        Some(entry)
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, id: &RevocationId, entry: RevocationEntry) -> DomainResult<()> {
        self.entries.entry(id.storage_key()).or_insert(entry);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str, family_id: Option<&str>) -> DomainResult<bool> {
        let jti_key = RevocationId::Jti(jti.to_string()).storage_key();
        if self.live_entry(&jti_key).is_some() {
            return Ok(true);
        }
        if let Some(family) = family_id {
            let family_key = RevocationId::Family(family.to_string()).storage_key();
            if self.live_entry(&family_key).is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn get(&self, id: &RevocationId) -> DomainResult<Option<RevocationEntry>> {
        Ok(self.live_entry(&id.storage_key()))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()))
    }
}
