//! Unit tests for the file backed key store

use chrono::{Duration, Utc};
use tempfile::tempdir;

use signet_core::domain::entities::key_pair::{KeyAlgorithm, KeyPair, KeyStatus};
use signet_core::errors::KeyError;
use signet_core::repositories::key_store::{KeyStore, StatusTransition};

use crate::keystore::FileKeyStore;

fn sample_key(kid: &str, created_offset_seconds: i64) -> KeyPair {
    let created_at = Utc::now() + Duration::seconds(created_offset_seconds);
    KeyPair {
        kid: kid.to_string(),
        algorithm: KeyAlgorithm::Rs256,
        private_key_pem: format!("private-{kid}"),
        public_key_pem: format!("public-{kid}"),
        status: KeyStatus::Active,
        created_at,
        not_before: created_at,
        retiring_since: None,
        retired_at: None,
    }
}

#[tokio::test]
async fn test_missing_file_reads_as_empty_set() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();

    let records = store.load_all().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_persist_and_load_roundtrip() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();
    let key = sample_key("k1", 0);

    store.persist(&key).await.unwrap();

    let records = store.load_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], key);
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let key = sample_key("k1", 0);
    {
        let store = FileKeyStore::open(dir.path()).await.unwrap();
        store.persist(&key).await.unwrap();
    }

    let reopened = FileKeyStore::open(dir.path()).await.unwrap();
    let records = reopened.load_all().await.unwrap();
    assert_eq!(records, vec![key]);
}

#[tokio::test]
async fn test_load_all_orders_by_creation_time_then_kid() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();

    store.persist(&sample_key("k-newest", 10)).await.unwrap();
    store.persist(&sample_key("k-oldest", -10)).await.unwrap();
    store.persist(&sample_key("k-middle", 0)).await.unwrap();

    let kids: Vec<String> = store
        .load_all()
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.kid)
        .collect();
    assert_eq!(kids, vec!["k-oldest", "k-middle", "k-newest"]);
}

#[tokio::test]
async fn test_persist_identical_record_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();
    let key = sample_key("k1", 0);

    store.persist(&key).await.unwrap();
    store.persist(&key).await.unwrap();

    assert_eq!(store.load_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_persist_conflicting_record_rejected() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();
    let key = sample_key("k1", 0);
    let mut conflicting = key.clone();
    conflicting.public_key_pem = "different-material".to_string();

    store.persist(&key).await.unwrap();
    let result = store.persist(&conflicting).await;

    assert!(matches!(result, Err(KeyError::DuplicateKeyId { kid }) if kid == "k1"));
    let records = store.load_all().await.unwrap();
    assert_eq!(records[0].public_key_pem, key.public_key_pem);
}

#[tokio::test]
async fn test_mark_status_stamps_lifecycle_timestamps() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();
    store.persist(&sample_key("k1", 0)).await.unwrap();

    let retiring_at = Utc::now() + Duration::seconds(60);
    store
        .mark_status("k1", KeyStatus::Retiring, retiring_at)
        .await
        .unwrap();

    let record = store.load_all().await.unwrap().remove(0);
    assert_eq!(record.status, KeyStatus::Retiring);
    assert_eq!(record.retiring_since, Some(retiring_at));
    assert_eq!(record.retired_at, None);

    let retired_at = retiring_at + Duration::seconds(60);
    store
        .mark_status("k1", KeyStatus::Retired, retired_at)
        .await
        .unwrap();

    let record = store.load_all().await.unwrap().remove(0);
    assert_eq!(record.status, KeyStatus::Retired);
    assert_eq!(record.retiring_since, Some(retiring_at));
    assert_eq!(record.retired_at, Some(retired_at));
}

#[tokio::test]
async fn test_mark_status_unknown_kid_fails() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();

    let result = store
        .mark_status("missing", KeyStatus::Retired, Utc::now())
        .await;

    assert!(matches!(result, Err(KeyError::KeyNotFound { kid }) if kid == "missing"));
}

#[tokio::test]
async fn test_apply_rotation_commits_once_and_survives_reopen() {
    let dir = tempdir().unwrap();
    let now = Utc::now();
    {
        let store = FileKeyStore::open(dir.path()).await.unwrap();
        store.persist(&sample_key("k-old", -100)).await.unwrap();
        store
            .apply_rotation(
                &sample_key("k-new", 0),
                &[StatusTransition::new("k-old", KeyStatus::Retiring, now)],
            )
            .await
            .unwrap();
    }

    let reopened = FileKeyStore::open(dir.path()).await.unwrap();
    let records = reopened.load_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kid, "k-old");
    assert_eq!(records[0].status, KeyStatus::Retiring);
    assert_eq!(records[0].retiring_since, Some(now));
    assert_eq!(records[1].kid, "k-new");
    assert_eq!(records[1].status, KeyStatus::Active);
}

#[tokio::test]
async fn test_rotation_against_unknown_kid_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();
    store.persist(&sample_key("k-old", -100)).await.unwrap();

    let result = store
        .apply_rotation(
            &sample_key("k-new", 0),
            &[StatusTransition::new("ghost", KeyStatus::Retiring, Utc::now())],
        )
        .await;

    assert!(matches!(result, Err(KeyError::KeyNotFound { kid }) if kid == "ghost"));
    let kids: Vec<String> = store
        .load_all()
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.kid)
        .collect();
    assert_eq!(kids, vec!["k-old"]);
}

#[tokio::test]
async fn test_corrupt_file_reports_storage_unavailable() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();
    tokio::fs::write(store.path(), b"{ this is not json")
        .await
        .unwrap();

    let result = store.load_all().await;

    assert!(matches!(result, Err(KeyError::StorageUnavailable { .. })));
}

#[tokio::test]
async fn test_commit_leaves_no_temporary_file_behind() {
    let dir = tempdir().unwrap();
    let store = FileKeyStore::open(dir.path()).await.unwrap();
    store.persist(&sample_key("k1", 0)).await.unwrap();

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    assert_eq!(names, vec!["keys.json"]);
}
