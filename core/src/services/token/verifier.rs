//! Token verification
//!
//! Checks run in a fixed order: structure, key lookup, signature,
//! validity window, revocation. The first failing check decides the
//! error, so a tampered token that also expired reports the signature.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};
use tracing::debug;

use super::config::TokenPolicy;
use crate::domain::entities::token::{Claims, TokenType, VerifiedToken};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::revocation::RevocationStore;
use crate::services::keys::{KeySource, VerificationKey};

/// Verifies RS256 tokens against a key source and a revocation store
///
/// Verification is read-only: no call here ever writes to either
/// dependency, so verifiers can run in processes that only hold public
/// key material.
pub struct TokenVerifier {
    key_source: Arc<dyn KeySource>,
    revocations: Arc<dyn RevocationStore>,
    policy: TokenPolicy,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a new verifier.
    pub fn new(
        key_source: Arc<dyn KeySource>,
        revocations: Arc<dyn RevocationStore>,
        policy: TokenPolicy,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = policy.clock_skew_leeway_seconds.max(0) as u64;
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self {
            key_source,
            revocations,
            policy,
            validation,
        }
    }

    /// Runs every check that needs no revocation state: structure, key
    /// lookup, signature, and validity window.
    ///
    /// The refresh coordinator uses this directly because it handles
    /// revocation itself; everything else should call [`verify`].
    ///
    /// [`verify`]: TokenVerifier::verify
    pub async fn decode(&self, token: &str) -> DomainResult<VerifiedToken> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| DomainError::Token(TokenError::MalformedToken))?;
        let kid = header
            .kid
            .ok_or(DomainError::Token(TokenError::MalformedToken))?;

        let key = self.find_key(&kid).await?;
        let data = jsonwebtoken::decode::<Claims>(token, &key.decoding_key, &self.validation)
            .map_err(|e| DomainError::Token(map_decode_error(&e)))?;
        let claims = data.claims;

        // The library validates `exp`; an `iat` in the future is on us.
        let now = Utc::now().timestamp();
        if claims.iat > now + self.policy.clock_skew_leeway_seconds {
            return Err(TokenError::TokenNotYetValid.into());
        }

        Ok(VerifiedToken { claims, kid })
    }

    /// Full verification including the revocation check.
    ///
    /// # Returns
    ///
    /// * `Ok(VerifiedToken)` - Claims plus the kid that vouched for them
    /// * `Err(DomainError::Token)` - The first check that failed
    pub async fn verify(&self, token: &str) -> DomainResult<VerifiedToken> {
        let verified = self.decode(token).await?;

        let revoked = self
            .revocations
            .is_revoked(&verified.claims.jti, verified.claims.family_id.as_deref())
            .await?;
        if revoked {
            debug!(jti = %verified.claims.jti, "rejected revoked token");
            return Err(TokenError::TokenRevoked.into());
        }

        Ok(verified)
    }

    /// Full verification that additionally requires a token kind.
    pub async fn verify_typed(
        &self,
        token: &str,
        expected: TokenType,
    ) -> DomainResult<VerifiedToken> {
        let verified = self.verify(token).await?;
        if verified.claims.token_type != expected {
            return Err(TokenError::WrongTokenType {
                expected: expected.to_string(),
                actual: verified.claims.token_type.to_string(),
            }
            .into());
        }
        Ok(verified)
    }

    async fn find_key(&self, kid: &str) -> DomainResult<VerificationKey> {
        let keys = self.key_source.verification_keys().await?;
        if let Some(key) = keys.iter().find(|k| k.kid == kid) {
            return Ok(key.clone());
        }

        // An unfamiliar kid right after a rotation: give the source one
        // chance to observe newer material before rejecting.
        if let Err(e) = self.key_source.refresh().await {
            debug!("key source refresh failed: {}", e);
        }
        let keys = self.key_source.verification_keys().await?;
        keys.iter().find(|k| k.kid == kid).cloned().ok_or_else(|| {
            TokenError::UnknownKey {
                kid: kid.to_string(),
            }
            .into()
        })
    }
}

fn map_decode_error(error: &jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::MalformedToken,
    }
}
