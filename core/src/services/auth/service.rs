//! Facade over the token authentication core

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use signet_shared::config::AuthConfig;

use crate::domain::entities::token::{TokenPair, TokenType, VerifiedToken};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::key_store::KeyStore;
use crate::repositories::revocation::RevocationStore;
use crate::services::keys::{
    DiscoveryPublisher, JwksDocument, KeyManager, KeySource, PemKeyDocument, RotationOutcome,
    RotationPolicy,
};
use crate::services::token::{RefreshCoordinator, TokenIssuer, TokenPolicy, TokenVerifier};

/// Single entry point collaborators wire against
///
/// Owns the whole stack: key manager, issuer, verifier, refresh
/// coordinator, and discovery publisher, built over a [`KeyStore`] and
/// a [`RevocationStore`] the caller provides. Every operation delegates
/// inward; the facade adds no policy of its own.
pub struct AuthService<S: KeyStore> {
    /// Signing key set and rotation
    key_manager: Arc<KeyManager<S>>,
    /// Token signing
    issuer: Arc<TokenIssuer<S>>,
    /// Token verification against the local key set
    verifier: Arc<TokenVerifier>,
    /// Refresh rotation and family bookkeeping
    coordinator: RefreshCoordinator<S>,
    /// Discovery document rendering
    publisher: DiscoveryPublisher,
    /// Shared revocation state
    revocations: Arc<dyn RevocationStore>,
}

impl<S: KeyStore + 'static> AuthService<S> {
    /// Wires the full stack over the given stores.
    ///
    /// Validates the configuration, loads the key set, and generates an
    /// initial signing key when the store holds none.
    ///
    /// # Arguments
    ///
    /// * `key_store` - Durable home of the signing key set
    /// * `revocations` - Revocation state shared with other verifiers
    /// * `config` - Lifetimes, rotation policy, and discovery settings
    ///
    /// # Errors
    ///
    /// `DomainError::Validation` when the configuration is internally
    /// inconsistent, otherwise whatever loading or generating keys
    /// surfaces.
    pub async fn new(
        key_store: Arc<S>,
        revocations: Arc<dyn RevocationStore>,
        config: &AuthConfig,
    ) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Validation { message })?;

        let key_manager =
            Arc::new(KeyManager::bootstrap(key_store, RotationPolicy::from(config)).await?);
        let policy = TokenPolicy::from(config);
        let issuer = Arc::new(TokenIssuer::new(Arc::clone(&key_manager), policy.clone()));
        let verifier = Arc::new(TokenVerifier::new(
            Arc::clone(&key_manager) as Arc<dyn KeySource>,
            Arc::clone(&revocations),
            policy.clone(),
        ));
        let coordinator = RefreshCoordinator::new(
            Arc::clone(&issuer),
            Arc::clone(&verifier),
            Arc::clone(&revocations),
            policy,
        );

        let snapshot = key_manager.snapshot().await;
        info!(active_kid = ?snapshot.active_kid(), "authentication core ready");
        Ok(Self {
            key_manager,
            issuer,
            verifier,
            coordinator,
            publisher: DiscoveryPublisher::with_cache_max_age(config.discovery.refresh_interval),
            revocations,
        })
    }

    /// Issues a bare access token for the subject.
    pub async fn issue_access_token(&self, subject: &str) -> DomainResult<String> {
        let issued = self.issuer.issue_access_token(subject).await?;
        Ok(issued.token)
    }

    /// Issues a standalone refresh token, starting a new family.
    pub async fn issue_refresh_token(&self, subject: &str) -> DomainResult<String> {
        let issued = self.coordinator.issue_refresh_token(subject).await?;
        Ok(issued.token)
    }

    /// Starts a session and returns its first token pair.
    pub async fn login(&self, subject: &str) -> DomainResult<TokenPair> {
        self.coordinator.login(subject).await
    }

    /// Exchanges a refresh token for the next generation pair.
    ///
    /// The presented token stops working immediately; presenting it a
    /// second time revokes the whole family.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.coordinator.refresh(refresh_token).await
    }

    /// Ends the session the refresh token belongs to.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        self.coordinator.logout(refresh_token).await
    }

    /// Verifies a token of either kind.
    pub async fn verify(&self, token: &str) -> DomainResult<VerifiedToken> {
        self.verifier.verify(token).await
    }

    /// Verifies a token presented as an access token.
    ///
    /// Refresh tokens are rejected here so they cannot be replayed
    /// against resource endpoints.
    pub async fn verify_access_token(&self, token: &str) -> DomainResult<VerifiedToken> {
        self.verifier.verify_typed(token, TokenType::Access).await
    }

    /// JWKS document for the current verifiable key set.
    pub async fn jwks(&self) -> DomainResult<JwksDocument> {
        let snapshot = self.key_manager.snapshot().await;
        Ok(self.publisher.jwks(&snapshot)?)
    }

    /// Single-key PEM document for the active key.
    pub async fn public_key_document(&self) -> DomainResult<PemKeyDocument> {
        let snapshot = self.key_manager.snapshot().await;
        Ok(self.publisher.pem_document(&snapshot)?)
    }

    /// Suggested cache lifetime for the discovery documents.
    pub fn discovery_cache_max_age(&self) -> std::time::Duration {
        self.publisher.cache_max_age()
    }

    /// Rotates the signing key set now.
    pub async fn rotate_keys(&self) -> DomainResult<RotationOutcome> {
        self.key_manager.rotate().await
    }

    /// Drops expired revocation entries and family bookkeeping.
    ///
    /// # Returns
    ///
    /// Total number of records removed
    pub async fn purge_expired(&self) -> DomainResult<usize> {
        let now = Utc::now();
        let entries = self.revocations.purge_expired(now).await?;
        let families = self.coordinator.prune_families(now);
        Ok(entries + families)
    }

    /// Key manager handle, for wiring a rotation scheduler.
    pub fn key_manager(&self) -> Arc<KeyManager<S>> {
        Arc::clone(&self.key_manager)
    }
}
