//! Integration tests for the Redis revocation store
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p signet_infra --test redis_revocation -- --ignored

use chrono::{Duration, Utc};

use signet_core::domain::entities::revocation::{RevocationEntry, RevocationId, RevocationReason};
use signet_core::repositories::revocation::RevocationStore;
use signet_infra::RedisRevocationStore;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

async fn connect() -> RedisRevocationStore {
    RedisRevocationStore::connect(&redis_url())
        .await
        .expect("Failed to connect to Redis")
}

/// Entries carry a short TTL, so runs clean up after themselves; the
/// nanosecond suffix keeps runs from seeing each other's keys.
fn unique(tag: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("it-{}-{}", tag, nanos)
}

fn live_entry(reason: RevocationReason) -> RevocationEntry {
    RevocationEntry::new(reason, Utc::now() + Duration::seconds(60))
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_connection_health() {
    let store = connect().await;

    assert!(store.health_check().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_revoke_and_lookup_roundtrip() {
    let store = connect().await;
    let jti = unique("jti");
    let entry = live_entry(RevocationReason::Logout);

    store
        .revoke(&RevocationId::Jti(jti.clone()), entry.clone())
        .await
        .unwrap();

    assert!(store.is_revoked(&jti, None).await.unwrap());
    assert!(!store.is_revoked(&unique("other"), None).await.unwrap());

    let stored = store
        .get(&RevocationId::Jti(jti))
        .await
        .unwrap()
        .expect("entry should be stored");
    assert_eq!(stored.reason, RevocationReason::Logout);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_family_revocation_covers_members() {
    let store = connect().await;
    let family_id = unique("family");
    let member_jti = unique("member");

    store
        .revoke(
            &RevocationId::Family(family_id.clone()),
            live_entry(RevocationReason::ReuseDetected),
        )
        .await
        .unwrap();

    // The member's own jti was never revoked; the family entry covers it.
    assert!(!store.is_revoked(&member_jti, None).await.unwrap());
    assert!(store
        .is_revoked(&member_jti, Some(&family_id))
        .await
        .unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_double_revoke_keeps_earliest_entry() {
    let store = connect().await;
    let id = RevocationId::Jti(unique("jti"));

    store
        .revoke(&id, live_entry(RevocationReason::Logout))
        .await
        .unwrap();
    store
        .revoke(&id, live_entry(RevocationReason::ReuseDetected))
        .await
        .unwrap();

    let stored = store.get(&id).await.unwrap().expect("entry should remain");
    assert_eq!(stored.reason, RevocationReason::Logout);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_entry_for_expired_token_is_not_written() {
    let store = connect().await;
    let jti = unique("jti");
    let dead = RevocationEntry::new(RevocationReason::Logout, Utc::now() - Duration::seconds(5));

    store
        .revoke(&RevocationId::Jti(jti.clone()), dead)
        .await
        .unwrap();

    assert!(!store.is_revoked(&jti, None).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_purge_is_a_noop() {
    let store = connect().await;

    assert_eq!(store.purge_expired(Utc::now()).await.unwrap(), 0);
}
