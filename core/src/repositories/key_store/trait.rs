//! Key store abstraction for durable signing key records

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::key_pair::{KeyPair, KeyStatus};
use crate::errors::KeyError;

/// A single status change applied to an existing key during rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    /// Key identifier the change applies to
    pub kid: String,
    /// Status the key moves to
    pub status: KeyStatus,
    /// Instant the change takes effect
    pub at: DateTime<Utc>,
}

impl StatusTransition {
    /// Creates a status transition for the given key.
    pub fn new(kid: impl Into<String>, status: KeyStatus, at: DateTime<Utc>) -> Self {
        Self {
            kid: kid.into(),
            status,
            at,
        }
    }
}

/// Repository trait for persisting signing key pairs
///
/// Implementations own the durability of the key set. The manager layer
/// keeps keys in memory and only goes through this trait at startup and
/// when a rotation changes the set.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Loads every stored key record, ordered by creation time then kid.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<KeyPair>)` - All records, possibly empty on first boot
    /// * `Err(KeyError::StorageUnavailable)` - The backing store could not be read
    async fn load_all(&self) -> Result<Vec<KeyPair>, KeyError>;

    /// Persists a new key record.
    ///
    /// Saving a record whose `kid` already exists with identical content
    /// succeeds without effect, so a retried write stays safe. A `kid`
    /// collision with different content fails with
    /// [`KeyError::DuplicateKeyId`].
    async fn persist(&self, key: &KeyPair) -> Result<(), KeyError>;

    /// Updates the lifecycle status of an existing key.
    ///
    /// Stamps `retiring_since` or `retired_at` on the stored record as the
    /// new status requires. Fails with [`KeyError::KeyNotFound`] for an
    /// unknown `kid`.
    async fn mark_status(
        &self,
        kid: &str,
        status: KeyStatus,
        at: DateTime<Utc>,
    ) -> Result<(), KeyError>;

    /// Applies one rotation outcome: a new key plus status changes to
    /// existing keys.
    ///
    /// The default implementation applies the steps sequentially. Stores
    /// that can write the whole key set in one durable step should
    /// override this so a crash cannot leave a partial rotation behind.
    async fn apply_rotation(
        &self,
        new_key: &KeyPair,
        transitions: &[StatusTransition],
    ) -> Result<(), KeyError> {
        self.persist(new_key).await?;
        for transition in transitions {
            self.mark_status(&transition.kid, transition.status, transition.at)
                .await?;
        }
        Ok(())
    }
}
