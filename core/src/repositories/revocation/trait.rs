//! Revocation store abstraction for denied tokens and token families

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::revocation::{RevocationEntry, RevocationId};
use crate::errors::DomainResult;

/// Repository trait for revocation entries
///
/// Entries are write-once: revoking an id that is already revoked keeps
/// the original entry, so the recorded reason and timestamp reflect the
/// first revocation. Each entry carries the expiry of the token it
/// denies; once that instant has passed the entry no longer affects
/// verification and the store may drop it.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Records a revocation. Succeeds silently when the id is already revoked.
    async fn revoke(&self, id: &RevocationId, entry: RevocationEntry) -> DomainResult<()>;

    /// Whether the token identified by `jti`, or the whole family it
    /// belongs to, has a live revocation entry.
    async fn is_revoked(&self, jti: &str, family_id: Option<&str>) -> DomainResult<bool>;

    /// The live revocation entry for an id, if any.
    async fn get(&self, id: &RevocationId) -> DomainResult<Option<RevocationEntry>>;

    /// Drops entries whose tokens expired before `now`.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of entries removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize>;
}
