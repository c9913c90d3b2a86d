//! Service-level traits for key distribution

use std::sync::Arc;

use async_trait::async_trait;

use super::material::VerificationKey;
use crate::errors::DomainResult;

/// Source of verification key handles for token validation
///
/// Implemented by the local [`KeyManager`] and by remote JWKS clients in
/// the infrastructure crate. Verifiers treat the two identically.
///
/// [`KeyManager`]: super::manager::KeyManager
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Current verification key handles.
    async fn verification_keys(&self) -> DomainResult<Arc<Vec<VerificationKey>>>;

    /// Asks the source to observe newer key material before the next
    /// read. Local sources are always current, so the default is a no-op.
    async fn refresh(&self) -> DomainResult<()> {
        Ok(())
    }
}
