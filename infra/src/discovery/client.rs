//! HTTP JWKS client
//!
//! Fetches an authority's JWKS document and caches the decoded
//! verification key handles. A failed fetch keeps serving the previous
//! cache; verification only stops when no document has ever been
//! fetched. Repeated failures back off exponentially so a dead
//! authority is not hammered on every verification.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use signet_core::errors::{DomainError, DomainResult};
use signet_core::services::keys::{JwksDocument, KeySource, VerificationKey};
use signet_shared::config::DiscoveryConfig;

use crate::InfrastructureError;

/// First delay after a failed fetch; doubles per consecutive failure
const BASE_BACKOFF_MS: u64 = 500;

/// Cap on doublings so the shift stays in range
const MAX_BACKOFF_DOUBLINGS: u32 = 10;

/// Key set fetched from the authority at one point in time
struct CachedKeySet {
    keys: Arc<Vec<VerificationKey>>,
    fetched_at: Instant,
}

struct FetchState {
    cache: Option<CachedKeySet>,
    consecutive_failures: u32,
    last_attempt: Option<Instant>,
}

/// [`KeySource`] backed by a remote JWKS endpoint
///
/// Verifiers read from the cache; the document is refetched once it is
/// older than the configured refresh interval, and immediately when a
/// verifier reports a kid the cache does not know.
pub struct HttpKeySetClient {
    http: reqwest::Client,
    jwks_url: String,
    refresh_interval: Duration,
    max_backoff: Duration,
    state: RwLock<FetchState>,
}

impl HttpKeySetClient {
    /// Creates a client polling `jwks_url`.
    ///
    /// The fetch timeout from `config` bounds every request, so a hung
    /// authority cannot hang verification.
    ///
    /// # Errors
    ///
    /// Returns [`InfrastructureError::Http`] if the HTTP client cannot
    /// be constructed.
    pub fn new(
        jwks_url: impl Into<String>,
        config: &DiscoveryConfig,
    ) -> Result<Self, InfrastructureError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout))
            .build()?;
        Ok(Self {
            http,
            jwks_url: jwks_url.into(),
            refresh_interval: Duration::from_secs(config.refresh_interval),
            max_backoff: Duration::from_secs(config.max_backoff),
            state: RwLock::new(FetchState {
                cache: None,
                consecutive_failures: 0,
                last_attempt: None,
            }),
        })
    }

    /// URL this client polls.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Fetches the document once and swaps the cache on success.
    ///
    /// Useful at startup to fail fast on a misconfigured URL instead of
    /// surfacing the problem on the first verification.
    pub async fn refresh_now(&self) -> Result<(), InfrastructureError> {
        match self.fetch_keys().await {
            Ok(keys) => {
                let now = Instant::now();
                let mut state = self.state.write().await;
                debug!(url = %self.jwks_url, keys = keys.len(), "key set cache refreshed");
                state.cache = Some(CachedKeySet {
                    keys: Arc::new(keys),
                    fetched_at: now,
                });
                state.consecutive_failures = 0;
                state.last_attempt = Some(now);
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                state.last_attempt = Some(Instant::now());
                warn!(
                    url = %self.jwks_url,
                    failures = state.consecutive_failures,
                    error = %e,
                    "key set fetch failed"
                );
                Err(e)
            }
        }
    }

    async fn fetch_keys(&self) -> Result<Vec<VerificationKey>, InfrastructureError> {
        let document: JwksDocument = self
            .http
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = Vec::with_capacity(document.keys.len());
        for jwk in &document.keys {
            let key = VerificationKey::from_components(jwk.kid.as_str(), &jwk.n, &jwk.e)
                .map_err(|e| {
                    InfrastructureError::KeySet(format!("JWKS entry {} rejected: {}", jwk.kid, e))
                })?;
            keys.push(key);
        }
        Ok(keys)
    }

    /// Refreshes when the cached document is older than the refresh
    /// interval. Failures keep the previous cache.
    async fn ensure_fresh(&self) {
        let due = {
            let state = self.state.read().await;
            self.cache_stale(&state) && self.attempt_allowed(&state)
        };
        if due {
            let _ = self.refresh_now().await;
        }
    }

    fn cache_stale(&self, state: &FetchState) -> bool {
        match &state.cache {
            Some(cached) => cached.fetched_at.elapsed() >= self.refresh_interval,
            None => true,
        }
    }

    /// Whether the backoff window after the last failure has passed.
    fn attempt_allowed(&self, state: &FetchState) -> bool {
        if state.consecutive_failures == 0 {
            return true;
        }
        match state.last_attempt {
            Some(last) => last.elapsed() >= self.backoff_delay(state.consecutive_failures),
            None => true,
        }
    }

    fn backoff_delay(&self, failures: u32) -> Duration {
        let doublings = failures.saturating_sub(1).min(MAX_BACKOFF_DOUBLINGS);
        Duration::from_millis(BASE_BACKOFF_MS << doublings).min(self.max_backoff)
    }
}

#[async_trait]
impl KeySource for HttpKeySetClient {
    async fn verification_keys(&self) -> DomainResult<Arc<Vec<VerificationKey>>> {
        self.ensure_fresh().await;

        let state = self.state.read().await;
        match &state.cache {
            Some(cached) => Ok(Arc::clone(&cached.keys)),
            None => Err(DomainError::Internal {
                message: format!("no key set available from {}", self.jwks_url),
            }),
        }
    }

    // Called by verifiers that hit an unknown kid, which usually means
    // the authority rotated since the last fetch. A failed fetch is
    // swallowed while a previous document is cached; verification then
    // proceeds against the stale set.
    async fn refresh(&self) -> DomainResult<()> {
        let allowed = {
            let state = self.state.read().await;
            self.attempt_allowed(&state)
        };
        if !allowed {
            return Ok(());
        }
        match self.refresh_now().await {
            Ok(()) => Ok(()),
            Err(e) => {
                let state = self.state.read().await;
                if state.cache.is_some() {
                    Ok(())
                } else {
                    Err(DomainError::Internal {
                        message: format!("key set fetch from {} failed: {}", self.jwks_url, e),
                    })
                }
            }
        }
    }
}
