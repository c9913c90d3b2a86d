//! Refresh token rotation and session families
//!
//! Every login starts a token family. Each refresh retires the presented
//! token and issues the next generation inside the same family. A
//! presented token that was already retired is proof of reuse, and the
//! whole family is revoked with it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::config::TokenPolicy;
use super::issuer::{IssuedToken, TokenIssuer};
use super::verifier::TokenVerifier;
use crate::domain::entities::revocation::{
    FamilyStatus, RevocationEntry, RevocationId, RevocationReason,
};
use crate::domain::entities::token::{Claims, TokenPair, TokenType};
use crate::errors::{DomainResult, TokenError};
use crate::repositories::key_store::KeyStore;
use crate::repositories::revocation::RevocationStore;

/// Bookkeeping for one token family
#[derive(Debug, Clone)]
struct FamilyRecord {
    status: FamilyStatus,
    jtis: Vec<String>,
    expires_at: DateTime<Utc>,
}

/// Rotates refresh tokens and polices token families
///
/// Operations on one family serialize behind a per-family mutex, so two
/// concurrent presentations of the same token cannot both rotate.
/// Unrelated families proceed in parallel.
pub struct RefreshCoordinator<S: KeyStore> {
    issuer: Arc<TokenIssuer<S>>,
    verifier: Arc<TokenVerifier>,
    revocations: Arc<dyn RevocationStore>,
    policy: TokenPolicy,
    families: DashMap<String, FamilyRecord>,
    family_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: KeyStore> RefreshCoordinator<S> {
    /// Creates a new refresh coordinator.
    pub fn new(
        issuer: Arc<TokenIssuer<S>>,
        verifier: Arc<TokenVerifier>,
        revocations: Arc<dyn RevocationStore>,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            issuer,
            verifier,
            revocations,
            policy,
            families: DashMap::new(),
            family_locks: DashMap::new(),
        }
    }

    /// Starts a session: a fresh family with its first token pair.
    pub async fn login(&self, subject: &str) -> DomainResult<TokenPair> {
        let access = self.issuer.issue_access_token(subject).await?;
        let refresh = self.issue_refresh_token(subject).await?;

        info!(subject = %subject, "session started");
        Ok(self.pair(access, refresh))
    }

    /// Issues a refresh token in a fresh family and registers it, so a
    /// later [`refresh`](Self::refresh) can rotate it.
    pub async fn issue_refresh_token(&self, subject: &str) -> DomainResult<IssuedToken> {
        let refresh = self.issuer.issue_refresh_token(subject, None).await?;
        self.register(&refresh.claims);
        Ok(refresh)
    }

    /// Exchanges a refresh token for the next generation pair.
    ///
    /// The presented token is retired and stops working immediately. If
    /// it was already retired, the presentation counts as reuse: the
    /// whole family is revoked and the call fails with
    /// [`TokenError::ReuseDetected`].
    pub async fn refresh(&self, presented: &str) -> DomainResult<TokenPair> {
        let verified = self.verifier.decode(presented).await?;
        let claims = verified.claims;
        if claims.token_type != TokenType::Refresh {
            return Err(TokenError::WrongTokenType {
                expected: TokenType::Refresh.to_string(),
                actual: claims.token_type.to_string(),
            }
            .into());
        }
        let family_id = match claims.family_id.clone() {
            Some(id) => id,
            None => {
                return Err(TokenError::MissingClaim {
                    claim: "familyId".to_string(),
                }
                .into())
            }
        };

        let lock = self.family_lock(&family_id);
        let _guard = lock.lock().await;

        if self.is_replayed(&claims, &family_id).await? {
            self.compromise_family(&family_id, &claims).await?;
            return Err(TokenError::ReuseDetected.into());
        }

        // Retire the presented token; its own expiry bounds the entry.
        self.revocations
            .revoke(
                &RevocationId::Jti(claims.jti.clone()),
                RevocationEntry::new(RevocationReason::RotationSuperseded, claims.expires_at()),
            )
            .await?;

        let access = self.issuer.issue_access_token(&claims.sub).await?;
        let refresh = self
            .issuer
            .issue_refresh_token(&claims.sub, Some(family_id.clone()))
            .await?;
        self.register(&refresh.claims);
        self.mark_rotated(&family_id);

        Ok(self.pair(access, refresh))
    }

    /// Ends a session by revoking its whole family.
    ///
    /// Revoking an already revoked family succeeds, so clients can retry
    /// logout safely.
    pub async fn logout(&self, presented: &str) -> DomainResult<()> {
        let verified = self.verifier.decode(presented).await?;
        let claims = verified.claims;
        if claims.token_type != TokenType::Refresh {
            return Err(TokenError::WrongTokenType {
                expected: TokenType::Refresh.to_string(),
                actual: claims.token_type.to_string(),
            }
            .into());
        }
        let family_id = match claims.family_id.clone() {
            Some(id) => id,
            None => {
                return Err(TokenError::MissingClaim {
                    claim: "familyId".to_string(),
                }
                .into())
            }
        };

        let lock = self.family_lock(&family_id);
        let _guard = lock.lock().await;

        let (jtis, horizon) = self.family_scope(&family_id, &claims);
        let entry = RevocationEntry::new(RevocationReason::Logout, horizon);
        self.revoke_family_members(&family_id, &jtis, &claims.jti, entry)
            .await?;
        self.families.remove(&family_id);

        info!(family_id = %family_id, "session ended");
        Ok(())
    }

    /// Status the coordinator tracks for a family, if it still does.
    pub fn family_status(&self, family_id: &str) -> Option<FamilyStatus> {
        self.families.get(family_id).map(|record| record.status)
    }

    /// Drops bookkeeping for families whose newest token has expired.
    ///
    /// # Returns
    ///
    /// Number of family records removed
    pub fn prune_families(&self, now: DateTime<Utc>) -> usize {
        let before = self.families.len();
        self.families.retain(|_, record| record.expires_at > now);
        before.saturating_sub(self.families.len())
    }

    fn pair(&self, access: IssuedToken, refresh: IssuedToken) -> TokenPair {
        TokenPair::new(
            access.token,
            refresh.token,
            self.policy.access_token_lifetime_seconds,
            self.policy.refresh_token_lifetime_seconds,
        )
    }

    /// A presented token that is individually revoked, or whose family
    /// is revoked or compromised, counts as replayed.
    async fn is_replayed(&self, claims: &Claims, family_id: &str) -> DomainResult<bool> {
        if self
            .revocations
            .get(&RevocationId::Jti(claims.jti.clone()))
            .await?
            .is_some()
        {
            return Ok(true);
        }
        if self
            .revocations
            .get(&RevocationId::Family(family_id.to_string()))
            .await?
            .is_some()
        {
            return Ok(true);
        }
        let compromised = self
            .families
            .get(family_id)
            .map(|record| record.status == FamilyStatus::Compromised)
            .unwrap_or(false);
        Ok(compromised)
    }

    async fn compromise_family(&self, family_id: &str, presented: &Claims) -> DomainResult<()> {
        warn!(
            family_id = %family_id,
            subject = %presented.sub,
            "refresh token reuse detected, revoking whole family"
        );

        let (jtis, horizon) = self.family_scope(family_id, presented);
        let entry = RevocationEntry::new(RevocationReason::ReuseDetected, horizon);
        self.revoke_family_members(family_id, &jtis, &presented.jti, entry)
            .await?;

        if let Some(mut record) = self.families.get_mut(family_id) {
            record.status = FamilyStatus::Compromised;
        }
        Ok(())
    }

    /// Known jtis of a family and the latest expiry the revocation
    /// entries must outlive.
    fn family_scope(&self, family_id: &str, presented: &Claims) -> (Vec<String>, DateTime<Utc>) {
        match self.families.get(family_id) {
            Some(record) => (
                record.jtis.clone(),
                record.expires_at.max(presented.expires_at()),
            ),
            None => (Vec::new(), presented.expires_at()),
        }
    }

    async fn revoke_family_members(
        &self,
        family_id: &str,
        jtis: &[String],
        presented_jti: &str,
        entry: RevocationEntry,
    ) -> DomainResult<()> {
        self.revocations
            .revoke(&RevocationId::Family(family_id.to_string()), entry.clone())
            .await?;
        for jti in jtis {
            self.revocations
                .revoke(&RevocationId::Jti(jti.clone()), entry.clone())
                .await?;
        }
        self.revocations
            .revoke(&RevocationId::Jti(presented_jti.to_string()), entry)
            .await
    }

    fn register(&self, claims: &Claims) {
        let family_id = match claims.family_id.as_deref() {
            Some(id) => id,
            None => return,
        };
        let mut record = self
            .families
            .entry(family_id.to_string())
            .or_insert_with(|| FamilyRecord {
                status: FamilyStatus::Valid,
                jtis: Vec::new(),
                expires_at: claims.expires_at(),
            });
        record.jtis.push(claims.jti.clone());
        let expiry = claims.expires_at();
        if expiry > record.expires_at {
            record.expires_at = expiry;
        }
    }

    fn mark_rotated(&self, family_id: &str) {
        if let Some(mut record) = self.families.get_mut(family_id) {
            if record.status == FamilyStatus::Valid {
                record.status = FamilyStatus::Rotated;
            }
        }
    }

    // Families get one mutex each; the map entry stays after logout so a
    // racing call never sees two different locks for one family.
    fn family_lock(&self, family_id: &str) -> Arc<Mutex<()>> {
        self.family_locks
            .entry(family_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
