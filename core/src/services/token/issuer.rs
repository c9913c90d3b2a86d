//! Token issuance
//!
//! Stamps claim sets and signs them with the active key. Issuance is
//! stateless: no token is stored anywhere, and family bookkeeping
//! belongs to the refresh coordinator.

use std::sync::Arc;

use jsonwebtoken::Header;
use uuid::Uuid;

use super::config::TokenPolicy;
use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::key_store::KeyStore;
use crate::services::keys::KeyManager;

/// A signed token together with the claims inside it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS serialization
    pub token: String,
    /// Claims that were signed
    pub claims: Claims,
}

/// Issues signed access and refresh tokens
pub struct TokenIssuer<S: KeyStore> {
    key_manager: Arc<KeyManager<S>>,
    policy: TokenPolicy,
}

impl<S: KeyStore> TokenIssuer<S> {
    /// Creates a new token issuer.
    pub fn new(key_manager: Arc<KeyManager<S>>, policy: TokenPolicy) -> Self {
        Self {
            key_manager,
            policy,
        }
    }

    /// Issues a short-lived access token for a subject.
    ///
    /// # Arguments
    ///
    /// * `subject` - User identifier placed in `sub`
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - Signed token and its claims
    /// * `Err(DomainError::Key)` - No active signing key is available
    pub async fn issue_access_token(&self, subject: &str) -> DomainResult<IssuedToken> {
        let claims =
            Claims::new_access_token(subject, self.policy.access_token_lifetime_seconds);
        self.sign(claims).await
    }

    /// Issues a refresh token.
    ///
    /// With no family id a fresh one starts a new session line; passing
    /// the existing id keeps a rotated token inside its family.
    pub async fn issue_refresh_token(
        &self,
        subject: &str,
        family_id: Option<String>,
    ) -> DomainResult<IssuedToken> {
        let family_id = family_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let claims = Claims::new_refresh_token(
            subject,
            family_id,
            self.policy.refresh_token_lifetime_seconds,
        );
        self.sign(claims).await
    }

    /// Signs prepared claims with the active key. Tests use this to mint
    /// tokens with arbitrary claim values.
    pub(crate) async fn sign(&self, claims: Claims) -> DomainResult<IssuedToken> {
        let signing = self.key_manager.active_signing_key().await?;
        let mut header = Header::new(signing.algorithm);
        header.kid = Some(signing.kid.clone());

        let token = jsonwebtoken::encode(&header, &claims, &signing.encoding_key).map_err(|e| {
            DomainError::Token(TokenError::GenerationFailed {
                message: e.to_string(),
            })
        })?;

        Ok(IssuedToken { token, claims })
    }
}
