//! In-memory key set management and rotation
//!
//! The manager owns the authoritative view of the signing key set.
//! Reads go through copy-on-write snapshots, so token issuance and
//! verification never wait on a rotation in progress and never observe
//! a half-applied one.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::config::RotationPolicy;
use super::material::{SigningKey, VerificationKey};
use super::traits::KeySource;
use crate::domain::entities::key_pair::{KeyPair, KeyStatus};
use crate::errors::{DomainError, DomainResult, KeyError};
use crate::repositories::key_store::{KeyStore, StatusTransition};

/// Immutable view of the key set at one point in time
#[derive(Debug, Clone)]
pub struct KeySetSnapshot {
    records: Vec<KeyPair>,
    signing: Option<Arc<SigningKey>>,
    verification: Arc<Vec<VerificationKey>>,
}

impl KeySetSnapshot {
    /// Builds a snapshot from stored records.
    ///
    /// Handles are constructed once here so later lookups are pure
    /// reads. Fails when more than one record claims active status or
    /// when key material does not parse.
    fn build(mut records: Vec<KeyPair>) -> Result<Self, DomainError> {
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.kid.cmp(&b.kid))
        });

        let active: Vec<&KeyPair> = records.iter().filter(|r| r.is_active()).collect();
        if active.len() > 1 {
            let kids: Vec<&str> = active.iter().map(|r| r.kid.as_str()).collect();
            return Err(DomainError::Validation {
                message: format!("multiple active signing keys: {}", kids.join(", ")),
            });
        }

        let signing = match active.first() {
            Some(record) => Some(Arc::new(SigningKey::from_key_pair(record)?)),
            None => None,
        };

        let mut verification = Vec::new();
        for record in records.iter().filter(|r| r.is_verifiable()) {
            verification.push(VerificationKey::from_key_pair(record)?);
        }

        Ok(Self {
            records,
            signing,
            verification: Arc::new(verification),
        })
    }

    /// All stored records in creation order, retired ones included.
    pub fn records(&self) -> &[KeyPair] {
        &self.records
    }

    /// Records currently accepted for verification, in creation order.
    pub fn verifiable_records(&self) -> impl Iterator<Item = &KeyPair> {
        self.records.iter().filter(|r| r.is_verifiable())
    }

    /// Handle for the active signing key, if one exists.
    pub fn signing_key(&self) -> Option<Arc<SigningKey>> {
        self.signing.clone()
    }

    /// Handles for every key the verifier should accept.
    pub fn verification_keys(&self) -> Arc<Vec<VerificationKey>> {
        Arc::clone(&self.verification)
    }

    /// Kid of the active signing key.
    pub fn active_kid(&self) -> Option<&str> {
        self.signing.as_deref().map(|s| s.kid.as_str())
    }
}

/// Summary of one applied rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    /// Kid of the newly activated key
    pub new_kid: String,
    /// Kid moved from active to retiring, when a previous active existed
    pub retiring_kid: Option<String>,
    /// Kids whose grace period lapsed and that left the verification set
    pub retired_kids: Vec<String>,
}

/// Coordinates the signing key lifecycle over a durable store
///
/// At most one key is active at any time. Rotation generates a fresh
/// active key, moves the previous active key into its grace period, and
/// retires keys whose grace period has lapsed. The store write and the
/// snapshot swap happen under one rotation lock, so concurrent rotations
/// serialize and a failed store write leaves the published set untouched.
pub struct KeyManager<S: KeyStore> {
    store: Arc<S>,
    policy: RotationPolicy,
    snapshot: RwLock<Arc<KeySetSnapshot>>,
    rotation_lock: Mutex<()>,
}

impl<S: KeyStore> KeyManager<S> {
    /// Loads the key set from the store.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable key record store
    /// * `policy` - Rotation policy, checked before anything is read
    ///
    /// # Returns
    ///
    /// * `Ok(KeyManager)` - Key set loaded and indexed
    /// * `Err(DomainError::Validation)` - The policy is unsound or the
    ///   store holds more than one active key
    /// * `Err(DomainError::Key)` - The store could not be read or holds
    ///   unparseable material
    pub async fn load(store: Arc<S>, policy: RotationPolicy) -> Result<Self, DomainError> {
        policy
            .validate()
            .map_err(|message| DomainError::Validation { message })?;

        let records = store.load_all().await?;
        let snapshot = KeySetSnapshot::build(records)?;
        info!(
            keys = snapshot.records().len(),
            active = ?snapshot.active_kid(),
            "key set loaded"
        );

        Ok(Self {
            store,
            policy,
            snapshot: RwLock::new(Arc::new(snapshot)),
            rotation_lock: Mutex::new(()),
        })
    }

    /// Loads the key set, generating a first key when the store holds no
    /// active one.
    pub async fn bootstrap(store: Arc<S>, policy: RotationPolicy) -> Result<Self, DomainError> {
        let manager = Self::load(store, policy).await?;
        if manager.snapshot().await.signing_key().is_none() {
            info!("no active signing key found, generating the initial key");
            manager.rotate().await?;
        }
        Ok(manager)
    }

    /// Current snapshot of the key set.
    pub async fn snapshot(&self) -> Arc<KeySetSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Handle for the key that signs new tokens.
    pub async fn active_signing_key(&self) -> Result<Arc<SigningKey>, KeyError> {
        self.snapshot()
            .await
            .signing_key()
            .ok_or(KeyError::NoActiveKey)
    }

    /// Generates a new active key and steps existing keys through the
    /// lifecycle: the previous active key starts retiring, and retiring
    /// keys past the grace period retire for good.
    pub async fn rotate(&self) -> Result<RotationOutcome, DomainError> {
        self.rotate_at(Utc::now()).await
    }

    /// Rotation against an explicit clock; `rotate` passes the real time.
    pub(crate) async fn rotate_at(&self, now: DateTime<Utc>) -> Result<RotationOutcome, DomainError> {
        let _rotation = self.rotation_lock.lock().await;

        let current = self.snapshot().await;
        let mut new_key = KeyPair::generate(self.policy.key_bits)?;
        new_key.created_at = now;
        new_key.not_before = now;

        let grace = Duration::seconds(self.policy.grace_period_seconds);
        let mut retiring_kid = None;
        let mut retired_kids = Vec::new();
        let mut transitions = Vec::new();

        for record in current.records() {
            match record.status {
                KeyStatus::Active => {
                    retiring_kid = Some(record.kid.clone());
                    transitions.push(StatusTransition::new(
                        record.kid.as_str(),
                        KeyStatus::Retiring,
                        now,
                    ));
                }
                KeyStatus::Retiring => {
                    let since = record.retiring_since.unwrap_or(record.created_at);
                    if now - since > grace {
                        retired_kids.push(record.kid.clone());
                        transitions.push(StatusTransition::new(
                            record.kid.as_str(),
                            KeyStatus::Retired,
                            now,
                        ));
                    }
                }
                KeyStatus::Retired => {}
            }
        }

        self.store.apply_rotation(&new_key, &transitions).await?;

        let records = self.store.load_all().await?;
        let rebuilt = KeySetSnapshot::build(records)?;
        *self.snapshot.write().await = Arc::new(rebuilt);

        let outcome = RotationOutcome {
            new_kid: new_key.kid.clone(),
            retiring_kid,
            retired_kids,
        };
        info!(
            new_kid = %outcome.new_kid,
            retiring = ?outcome.retiring_kid,
            retired = ?outcome.retired_kids,
            "signing key rotated"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl<S: KeyStore> KeySource for KeyManager<S> {
    async fn verification_keys(&self) -> DomainResult<Arc<Vec<VerificationKey>>> {
        Ok(self.snapshot().await.verification_keys())
    }
}
