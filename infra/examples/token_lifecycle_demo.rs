//! Example walking the full token lifecycle over a file backed key store
//!
//! Run with: cargo run --example token_lifecycle_demo

use std::sync::Arc;

use signet_core::repositories::revocation::{MemoryRevocationStore, RevocationStore};
use signet_core::services::auth::AuthService;
use signet_infra::FileKeyStore;
use signet_shared::config::AuthConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let key_dir = tempfile::tempdir()?;
    println!("Key set directory: {}", key_dir.path().display());

    let key_store = Arc::new(FileKeyStore::open(key_dir.path()).await?);
    let revocations = Arc::new(MemoryRevocationStore::new());
    let service = AuthService::new(
        key_store,
        Arc::clone(&revocations) as Arc<dyn RevocationStore>,
        &AuthConfig::default(),
    )
    .await?;

    println!("\n=== Token Lifecycle Demo ===\n");

    // 1. Start a session
    println!("1. Logging in subject 'user-42'");
    let pair = service.login("user-42").await?;
    println!("   ✓ Access token:  {:.40}...", pair.access_token);
    println!("   ✓ Refresh token: {:.40}...", pair.refresh_token);

    // 2. Verify the access token
    let verified = service.verify_access_token(&pair.access_token).await?;
    println!("\n2. Access token verified");
    println!("   Subject: {}", verified.subject());
    println!("   Signed by kid: {}", verified.kid);

    // 3. Publish the key set
    let jwks = service.jwks().await?;
    println!("\n3. JWKS document lists {} key(s)", jwks.keys.len());

    // 4. Rotate the signing key
    let outcome = service.rotate_keys().await?;
    println!("\n4. Rotated the signing key set");
    println!("   New kid: {}", outcome.new_kid);
    println!("   Retiring kid: {:?}", outcome.retiring_kid);

    // 5. Tokens from before the rotation ride out the grace period
    let verified = service.verify_access_token(&pair.access_token).await?;
    println!("\n5. Pre-rotation token still verifies (kid {})", verified.kid);

    // 6. Exchange the refresh token for the next generation
    println!("\n6. Exchanging the refresh token...");
    let next = service.refresh(&pair.refresh_token).await?;
    println!("   ✓ New pair issued");

    // 7. Replaying the retired token is reuse
    println!("\n7. Replaying the retired refresh token...");
    match service.refresh(&pair.refresh_token).await {
        Err(e) => println!("   ✗ Rejected: {}", e),
        Ok(_) => println!("   ! Unexpectedly accepted"),
    }

    // 8. The reuse revoked the whole family
    match service.verify(&next.refresh_token).await {
        Err(e) => println!("\n8. Newest refresh token is dead too: {}", e),
        Ok(_) => println!("\n8. Newest refresh token unexpectedly alive"),
    }

    println!("\n=== Demo Complete ===");

    Ok(())
}
