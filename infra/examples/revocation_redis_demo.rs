//! Example demonstrating the Redis backed revocation store
//!
//! Run with: cargo run --example revocation_redis_demo

use chrono::{Duration, Utc};

use signet_core::domain::entities::revocation::{
    RevocationEntry, RevocationId, RevocationReason,
};
use signet_core::repositories::revocation::RevocationStore;
use signet_infra::RedisRevocationStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://localhost:6379".to_string());

    println!("Connecting to Redis...");
    let store = match RedisRevocationStore::connect(&url).await {
        Ok(store) => {
            println!("✓ Connected to Redis successfully");
            store
        }
        Err(e) => {
            println!("✗ Failed to connect to Redis: {}", e);
            println!("  Make sure Redis is running on localhost:6379");
            return Ok(());
        }
    };

    println!("\n=== Revocation Store Demo ===\n");

    let stamp = Utc::now().timestamp();

    // 1. Revoke a single token
    let jti = format!("demo-token-{}", stamp);
    println!("1. Revoking token jti: {}", jti);
    store
        .revoke(
            &RevocationId::Jti(jti.clone()),
            RevocationEntry::new(RevocationReason::Logout, Utc::now() + Duration::minutes(5)),
        )
        .await?;
    println!("   ✓ Entry stored with a five minute TTL");

    // 2. Look the token up
    let revoked = store.is_revoked(&jti, None).await?;
    println!("\n2. Token is revoked: {}", revoked);

    // 3. Revoke a whole family
    let family = format!("demo-family-{}", stamp);
    println!("\n3. Revoking family: {}", family);
    store
        .revoke(
            &RevocationId::Family(family.clone()),
            RevocationEntry::new(
                RevocationReason::ReuseDetected,
                Utc::now() + Duration::minutes(5),
            ),
        )
        .await?;

    // 4. Any member of the family is now rejected
    let revoked = store.is_revoked("some-unseen-jti", Some(&family)).await?;
    println!("   Family member is revoked: {}", revoked);

    // 5. Read the stored entry back
    if let Some(entry) = store.get(&RevocationId::Family(family.clone())).await? {
        println!("\n4. Stored entry reason: {}", entry.reason);
        println!("   Recorded at: {}", entry.revoked_at);
    }

    println!("\n=== Demo Complete ===");

    Ok(())
}
