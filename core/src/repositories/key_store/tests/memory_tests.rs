//! Unit tests for the in-memory key store

use chrono::{Duration, Utc};

use crate::domain::entities::key_pair::{KeyAlgorithm, KeyPair, KeyStatus};
use crate::errors::KeyError;
use crate::repositories::key_store::{KeyStore, MemoryKeyStore, StatusTransition};

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
async fn test_persist_and_load_roundtrip() {
    let store = MemoryKeyStore::new();
    let key = sample_key("k1", 0);

    store.persist(&key).await.unwrap();

    let records = store.load_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], key);
}

#[tokio::test]
async fn test_load_all_orders_by_creation_time_then_kid() {
    let store = MemoryKeyStore::new();
    let newest = sample_key("k-newest", 10);
    let oldest = sample_key("k-oldest", -10);
    let middle = sample_key("k-middle", 0);

    store.persist(&newest).await.unwrap();
    store.persist(&oldest).await.unwrap();
    store.persist(&middle).await.unwrap();

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
    let store = MemoryKeyStore::new();
    let key = sample_key("k1", 0);

    store.persist(&key).await.unwrap();
    store.persist(&key).await.unwrap();

    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_persist_conflicting_record_rejected() {
    let store = MemoryKeyStore::new();
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
    let store = MemoryKeyStore::new();
    let key = sample_key("k1", 0);
    store.persist(&key).await.unwrap();

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
    let store = MemoryKeyStore::new();

    let result = store
        .mark_status("missing", KeyStatus::Retired, Utc::now())
        .await;

    assert!(matches!(result, Err(KeyError::KeyNotFound { kid }) if kid == "missing"));
}

#[tokio::test]
async fn test_apply_rotation_persists_key_and_transitions() {
    let store = MemoryKeyStore::new();
    let old_key = sample_key("k-old", -100);
    store.persist(&old_key).await.unwrap();

    let new_key = sample_key("k-new", 0);
    let now = Utc::now();
    store
        .apply_rotation(
            &new_key,
            &[StatusTransition::new("k-old", KeyStatus::Retiring, now)],
        )
        .await
        .unwrap();

    let records = store.load_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kid, "k-old");
    assert_eq!(records[0].status, KeyStatus::Retiring);
    assert_eq!(records[0].retiring_since, Some(now));
    assert_eq!(records[1].kid, "k-new");
    assert_eq!(records[1].status, KeyStatus::Active);
}
