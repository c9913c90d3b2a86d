//! File backed key store
//!
//! Persists the whole key set as one JSON document. Every commit writes
//! a temporary file and renames it over the records file, so readers
//! see either the previous set or the new one, never a partial write.
//! Private PEM material lives in this file; restrict the directory
//! permissions accordingly.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use signet_core::domain::entities::key_pair::{KeyPair, KeyStatus};
use signet_core::errors::KeyError;
use signet_core::repositories::key_store::{KeyStore, StatusTransition};

/// Records file name inside the store directory
const KEY_FILE: &str = "keys.json";

/// Key store writing the record set to a JSON file
pub struct FileKeyStore {
    path: PathBuf,
    // Serializes read-modify-write commits; plain reads go around it
    // because the rename publishing a commit is atomic.
    commit_lock: Mutex<()>,
}

impl FileKeyStore {
    /// Opens the store rooted at `dir`, creating the directory if
    /// needed. The records file is `<dir>/keys.json`.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, KeyError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| KeyError::StorageUnavailable {
                message: format!("cannot create key directory {}: {}", dir.display(), e),
            })?;

        let store = Self {
            path: dir.join(KEY_FILE),
            commit_lock: Mutex::new(()),
        };
        info!(path = %store.path.display(), "file key store opened");
        Ok(store)
    }

    /// Path of the records file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<KeyPair>, KeyError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            // First boot: no file yet means an empty set.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(KeyError::StorageUnavailable {
                    message: format!("cannot read {}: {}", self.path.display(), e),
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| KeyError::StorageUnavailable {
            message: format!("{} is corrupt: {}", self.path.display(), e),
        })
    }

    async fn write_records(&self, records: &[KeyPair]) -> Result<(), KeyError> {
        let json =
            serde_json::to_vec_pretty(records).map_err(|e| KeyError::StorageUnavailable {
                message: format!("cannot encode key records: {}", e),
            })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| KeyError::StorageUnavailable {
                message: format!("cannot write {}: {}", tmp.display(), e),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| KeyError::StorageUnavailable {
                message: format!("cannot commit {}: {}", self.path.display(), e),
            })?;

        debug!(records = records.len(), "key set committed");
        Ok(())
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn load_all(&self) -> Result<Vec<KeyPair>, KeyError> {
        let mut records = self.read_records().await?;
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.kid.cmp(&b.kid))
        });
        Ok(records)
    }

    async fn persist(&self, key: &KeyPair) -> Result<(), KeyError> {
        let _guard = self.commit_lock.lock().await;
        let mut records = self.read_records().await?;
        if !insert_record(&mut records, key)? {
            return Ok(());
        }
        self.write_records(&records).await
    }

    async fn mark_status(
        &self,
        kid: &str,
        status: KeyStatus,
        at: DateTime<Utc>,
    ) -> Result<(), KeyError> {
        let _guard = self.commit_lock.lock().await;
        let mut records = self.read_records().await?;
        apply_transition(&mut records, kid, status, at)?;
        self.write_records(&records).await
    }

    // One read-modify-write cycle, so a rotation lands in the file
    // completely or not at all.
    async fn apply_rotation(
        &self,
        new_key: &KeyPair,
        transitions: &[StatusTransition],
    ) -> Result<(), KeyError> {
        let _guard = self.commit_lock.lock().await;
        let mut records = self.read_records().await?;
        insert_record(&mut records, new_key)?;
        for transition in transitions {
            apply_transition(&mut records, &transition.kid, transition.status, transition.at)?;
        }
        self.write_records(&records).await
    }
}

/// Adds a record unless an identical one already exists.
///
/// # Returns
///
/// `Ok(true)` when the set changed, `Ok(false)` for an idempotent
/// re-persist of identical content
fn insert_record(records: &mut Vec<KeyPair>, key: &KeyPair) -> Result<bool, KeyError> {
    if let Some(existing) = records.iter().find(|r| r.kid == key.kid) {
        if existing == key {
            return Ok(false);
        }
        return Err(KeyError::DuplicateKeyId {
            kid: key.kid.clone(),
        });
    }
    records.push(key.clone());
    Ok(true)
}

fn apply_transition(
    records: &mut [KeyPair],
    kid: &str,
    status: KeyStatus,
    at: DateTime<Utc>,
) -> Result<(), KeyError> {
    let record = records
        .iter_mut()
        .find(|r| r.kid == kid)
        .ok_or_else(|| KeyError::KeyNotFound {
            kid: kid.to_string(),
        })?;
    match status {
        KeyStatus::Active => record.status = KeyStatus::Active,
        KeyStatus::Retiring => record.mark_retiring(at),
        KeyStatus::Retired => record.mark_retired(at),
    }
    Ok(())
}
