//! Unit tests for token issuance

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::Algorithm;

use super::mocks::{seeded_stack, stack_over, test_token_policy};
use crate::domain::entities::token::TokenType;
use crate::errors::{DomainError, KeyError};
use crate::repositories::key_store::MemoryKeyStore;

fn payload_json(token: &str) -> serde_json::Value {
    let payload = token.split('.').nth(1).unwrap();
    let bytes = URL_SAFE_NO_PAD.decode(payload).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_access_token_header_carries_kid_and_alg() {
    let stack = seeded_stack().await;
    let issued = stack.issuer.issue_access_token("u1").await.unwrap();

    let header = jsonwebtoken::decode_header(&issued.token).unwrap();
    assert_eq!(header.alg, Algorithm::RS256);

    let active_kid = stack.key_manager.active_signing_key().await.unwrap().kid.clone();
    assert_eq!(header.kid, Some(active_kid));
}

#[tokio::test]
async fn test_access_token_verifies_with_matching_claims() {
    let stack = seeded_stack().await;
    let issued = stack.issuer.issue_access_token("u1").await.unwrap();

    let verified = stack.verifier.verify(&issued.token).await.unwrap();
    assert_eq!(verified.claims, issued.claims);
    assert_eq!(verified.token_type(), TokenType::Access);
    assert_eq!(verified.claims.family_id, None);
    assert_eq!(
        issued.claims.exp - issued.claims.iat,
        test_token_policy().access_token_lifetime_seconds
    );
}

#[tokio::test]
async fn test_refresh_token_carries_family() {
    let stack = seeded_stack().await;

    let first = stack.issuer.issue_refresh_token("u1", None).await.unwrap();
    let family_id = first.claims.family_id.clone().unwrap();
    assert!(!family_id.is_empty());

    let second = stack
        .issuer
        .issue_refresh_token("u1", Some(family_id.clone()))
        .await
        .unwrap();
    assert_eq!(second.claims.family_id, Some(family_id));
    assert_ne!(second.claims.jti, first.claims.jti);
}

#[tokio::test]
async fn test_issuance_fails_without_active_key() {
    let stack = stack_over(Arc::new(MemoryKeyStore::new())).await;

    let result = stack.issuer.issue_access_token("u1").await;
    assert!(matches!(
        result,
        Err(DomainError::Key(KeyError::NoActiveKey))
    ));
}

#[tokio::test]
async fn test_payload_wire_format() {
    let stack = seeded_stack().await;

    let access = stack.issuer.issue_access_token("u1").await.unwrap();
    let json = payload_json(&access.token);
    assert_eq!(json["sub"], "u1");
    assert_eq!(json["type"], "access");
    assert!(json["iat"].is_i64());
    assert!(json["exp"].is_i64());
    assert!(json["jti"].is_string());
    assert!(json.get("familyId").is_none());
    // No issuer or audience claims on the wire.
    assert!(json.get("iss").is_none());
    assert!(json.get("aud").is_none());
    assert!(json.get("nbf").is_none());

    let refresh = stack.issuer.issue_refresh_token("u1", None).await.unwrap();
    let json = payload_json(&refresh.token);
    assert_eq!(json["type"], "refresh");
    assert_eq!(
        json["familyId"],
        refresh.claims.family_id.clone().unwrap().as_str()
    );
}
