//! Public key discovery documents
//!
//! Renders the verifiable key set as JWKS and PEM documents. Rendering
//! is pure: the same snapshot always yields the same document, so
//! responses can be cached until the set changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::manager::KeySetSnapshot;
use super::material;
use crate::domain::entities::key_pair::KeyPair;
use crate::errors::KeyError;

/// A single RSA public key in JWK form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `RSA`
    pub kty: String,
    /// Intended use, always `sig`
    #[serde(rename = "use")]
    pub use_: String,
    /// Signing algorithm
    pub alg: String,
    /// Key identifier matching JWT headers
    pub kid: String,
    /// Modulus, base64url without padding
    pub n: String,
    /// Public exponent, base64url without padding
    pub e: String,
}

/// RFC 7517 key set document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JwksDocument {
    /// Verifiable keys in creation order
    pub keys: Vec<Jwk>,
}

/// Single-key document for consumers that take one PEM instead of a
/// JWKS endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PemKeyDocument {
    /// Active public key, PEM encoded
    pub public_key: String,
    /// Identifier of the active key
    pub key_id: String,
    /// Signing algorithm
    pub algorithm: String,
    /// Intended use, always `sig`
    #[serde(rename = "use")]
    pub use_: String,
}

/// Renders discovery documents from key set snapshots
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryPublisher {
    cache_max_age_seconds: u64,
}

impl Default for DiscoveryPublisher {
    fn default() -> Self {
        Self {
            cache_max_age_seconds: 900, // matches the default refresh interval
        }
    }
}

impl DiscoveryPublisher {
    /// Creates a publisher with the default cache lifetime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a publisher advertising the given cache lifetime.
    pub fn with_cache_max_age(seconds: u64) -> Self {
        Self {
            cache_max_age_seconds: seconds,
        }
    }

    /// Suggested cache lifetime for rendered documents.
    ///
    /// Consumers polling the documents should refetch at this cadence;
    /// how the value reaches them (HTTP headers or otherwise) is the
    /// caller's concern.
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_seconds)
    }

    /// JWKS document covering every verifiable key.
    ///
    /// Entries keep the snapshot's creation order, so repeated renders
    /// of an unchanged set compare equal. Private material never enters
    /// the document.
    pub fn jwks(&self, snapshot: &KeySetSnapshot) -> Result<JwksDocument, KeyError> {
        let mut keys = Vec::new();
        for record in snapshot.verifiable_records() {
            keys.push(self.jwk(record)?);
        }
        Ok(JwksDocument { keys })
    }

    /// JWK entry for a single key record.
    pub fn jwk(&self, record: &KeyPair) -> Result<Jwk, KeyError> {
        let (n, e) = material::rsa_public_components(&record.public_key_pem)?;
        Ok(Jwk {
            kty: "RSA".to_string(),
            use_: "sig".to_string(),
            alg: record.algorithm.as_str().to_string(),
            kid: record.kid.clone(),
            n,
            e,
        })
    }

    /// Document carrying the active public key as bare PEM.
    pub fn pem_document(&self, snapshot: &KeySetSnapshot) -> Result<PemKeyDocument, KeyError> {
        let record = snapshot
            .records()
            .iter()
            .find(|r| r.is_active())
            .ok_or(KeyError::NoActiveKey)?;
        Ok(PemKeyDocument {
            public_key: record.public_key_pem.clone(),
            key_id: record.kid.clone(),
            algorithm: record.algorithm.as_str().to_string(),
            use_: "sig".to_string(),
        })
    }
}
