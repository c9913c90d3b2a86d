//! In-memory key store
//!
//! Backs unit tests and single-process deployments that do not need the
//! key set to survive a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::r#trait::{KeyStore, StatusTransition};
use crate::domain::entities::key_pair::{KeyPair, KeyStatus};
use crate::errors::KeyError;

/// Key store holding records in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    keys: Arc<RwLock<HashMap<String, KeyPair>>>,
}

impl MemoryKeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.keys.read().await.is_empty()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn load_all(&self) -> Result<Vec<KeyPair>, KeyError> {
        let keys = self.keys.read().await;
        let mut records: Vec<KeyPair> = keys.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.kid.cmp(&b.kid))
        });
        Ok(records)
    }

    async fn persist(&self, key: &KeyPair) -> Result<(), KeyError> {
        let mut keys = self.keys.write().await;
        if let Some(existing) = keys.get(&key.kid) {
            if existing == key {
                return Ok(());
            }
            return Err(KeyError::DuplicateKeyId {
                kid: key.kid.clone(),
            });
        }
        keys.insert(key.kid.clone(), key.clone());
        Ok(())
    }

    async fn mark_status(
        &self,
        kid: &str,
        status: KeyStatus,
        at: DateTime<Utc>,
    ) -> Result<(), KeyError> {
        let mut keys = self.keys.write().await;
        let record = keys.get_mut(kid).ok_or_else(|| KeyError::KeyNotFound {
            kid: kid.to_string(),
        })?;
        match status {
            KeyStatus::Active => record.status = KeyStatus::Active,
            KeyStatus::Retiring => record.mark_retiring(at),
            KeyStatus::Retired => record.mark_retired(at),
        }
        Ok(())
    }
}
