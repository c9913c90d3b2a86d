//! Signing key entities and RSA key material generation.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::KeyError;

/// Number of hex characters of the public key digest used as the key id
const KID_LENGTH: usize = 16;

/// Signing algorithm associated with a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    #[serde(rename = "RS256")]
    Rs256,
}

impl KeyAlgorithm {
    /// Algorithm name as it appears in JWT headers and JWK documents
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rs256 => "RS256",
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a signing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// The single key used for signing new tokens
    Active,
    /// No longer signs, still accepted for verification
    Retiring,
    /// Out of the verification set entirely
    Retired,
}

impl std::fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyStatus::Active => write!(f, "active"),
            KeyStatus::Retiring => write!(f, "retiring"),
            KeyStatus::Retired => write!(f, "retired"),
        }
    }
}

/// An RSA signing key pair with its lifecycle metadata
///
/// Private material is write-once: nothing mutates `private_key_pem`
/// after creation, and it never appears in published documents or in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// Stable key identifier carried in JWT headers and JWK entries
    pub kid: String,

    /// Signing algorithm
    pub algorithm: KeyAlgorithm,

    /// PKCS#8 PEM-encoded private key
    pub private_key_pem: String,

    /// SPKI PEM-encoded public key
    pub public_key_pem: String,

    /// Lifecycle status
    pub status: KeyStatus,

    /// When the key material was generated
    pub created_at: DateTime<Utc>,

    /// Earliest moment tokens signed by this key are accepted
    pub not_before: DateTime<Utc>,

    /// When the key left active status
    pub retiring_since: Option<DateTime<Utc>>,

    /// When the key left the verification set
    pub retired_at: Option<DateTime<Utc>>,
}

impl KeyPair {
    /// Generates a fresh RSA key pair in active status
    ///
    /// Generation is pure computation: it touches no store and has no
    /// side effects beyond drawing randomness.
    ///
    /// # Arguments
    ///
    /// * `bits` - RSA modulus size (2048 or larger)
    ///
    /// # Returns
    ///
    /// A new active `KeyPair`, or `KeyError::GenerationFailed`
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        let mut rng = OsRng;
        let private_key =
            RsaPrivateKey::new(&mut rng, bits).map_err(|e| KeyError::GenerationFailed {
                message: format!("RSA key generation failed: {}", e),
            })?;
        let public_key = private_key.to_public_key();

        let private_key_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::GenerationFailed {
                message: format!("private key PEM encoding failed: {}", e),
            })?
            .to_string();
        let public_key_pem =
            public_key
                .to_public_key_pem(LineEnding::LF)
                .map_err(|e| KeyError::GenerationFailed {
                    message: format!("public key PEM encoding failed: {}", e),
                })?;

        Ok(Self::from_pem(private_key_pem, public_key_pem))
    }

    /// Builds an active key pair from existing PEM material
    ///
    /// The key id is derived from the public PEM, so the same material
    /// always yields the same kid.
    pub fn from_pem(private_key_pem: impl Into<String>, public_key_pem: impl Into<String>) -> Self {
        let public_key_pem = public_key_pem.into();
        let now = Utc::now();

        Self {
            kid: Self::derive_kid(&public_key_pem),
            algorithm: KeyAlgorithm::Rs256,
            private_key_pem: private_key_pem.into(),
            public_key_pem,
            status: KeyStatus::Active,
            created_at: now,
            not_before: now,
            retiring_since: None,
            retired_at: None,
        }
    }

    /// Derives a key id from public key material
    ///
    /// First 16 hex characters of the SHA-256 digest over the PEM text.
    pub fn derive_kid(public_key_pem: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(public_key_pem.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..KID_LENGTH].to_string()
    }

    /// Whether this key signs new tokens
    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }

    /// Whether tokens signed by this key are still accepted
    pub fn is_verifiable(&self) -> bool {
        matches!(self.status, KeyStatus::Active | KeyStatus::Retiring)
    }

    /// Moves the key from active into the retiring state
    pub fn mark_retiring(&mut self, now: DateTime<Utc>) {
        self.status = KeyStatus::Retiring;
        self.retiring_since = Some(now);
    }

    /// Moves the key out of the verification set
    pub fn mark_retired(&mut self, now: DateTime<Utc>) {
        self.status = KeyStatus::Retired;
        self.retired_at = Some(now);
        if self.retiring_since.is_none() {
            self.retiring_since = Some(now);
        }
    }

    /// How long the key has been retiring, if it is
    pub fn retiring_for(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.retiring_since.map(|since| now - since)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("not_before", &self.not_before)
            .field("retiring_since", &self.retiring_since)
            .field("retired_at", &self.retired_at)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PUBLIC_KEY: &str = r#"-----BEGIN RSA PUBLIC KEY-----
MIIBCgKCAQEAyRE6rHuNR0QbHO3H3Kt2pOKGVhQqGZXInOduQNxXzuKlvQTLUTv4
l4sggh5/CYYi/cvI+SXVT9kPWSKXxJXBXd/4LkvcPuUakBoAkfh+eiFVMh2VrUyW
yj3MFl0HTVF9KwRXLAcwkREiS3npThHRyIxuy0ZMeZfxVL5arMhw1SRELB8HoGfG
/AtH89BIE9jDBHZ9dLelK9a184zAf8LwoPLxvJb3Il5nncqPcSfKDDodMFBIMc4l
QzDKL5gvmiXLXB1AGLm8KBjfE8s3L5xqi+yUod+j8MtvIj812dkS4QMiRVN/by2h
3ZY8LYVGrqZXZTcgn2ujn8uKjXLZVD5TdQIDAQAB
-----END RSA PUBLIC KEY-----"#;

    #[test]
    fn test_generate_produces_active_pair() {
        let pair = KeyPair::generate(2048).unwrap();

        assert_eq!(pair.status, KeyStatus::Active);
        assert_eq!(pair.algorithm, KeyAlgorithm::Rs256);
        assert_eq!(pair.kid.len(), 16);
        assert!(pair.private_key_pem.contains("BEGIN PRIVATE KEY"));
        assert!(pair.public_key_pem.contains("BEGIN PUBLIC KEY"));
        assert!(pair.is_active());
        assert!(pair.is_verifiable());
        assert!(pair.retiring_since.is_none());
        assert!(pair.retired_at.is_none());
    }

    #[test]
    fn test_kid_derivation_is_stable() {
        let kid1 = KeyPair::derive_kid(TEST_PUBLIC_KEY);
        let kid2 = KeyPair::derive_kid(TEST_PUBLIC_KEY);

        assert_eq!(kid1, kid2);
        assert_eq!(kid1.len(), 16);
        assert!(kid1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_kid_changes_with_material() {
        let kid1 = KeyPair::derive_kid(TEST_PUBLIC_KEY);
        let kid2 = KeyPair::derive_kid("-----BEGIN RSA PUBLIC KEY-----\nother\n-----END RSA PUBLIC KEY-----");

        assert_ne!(kid1, kid2);
    }

    #[test]
    fn test_status_transitions() {
        let mut pair = KeyPair::from_pem("private", TEST_PUBLIC_KEY);
        let t1 = Utc::now();

        pair.mark_retiring(t1);
        assert_eq!(pair.status, KeyStatus::Retiring);
        assert_eq!(pair.retiring_since, Some(t1));
        assert!(pair.is_verifiable());
        assert!(!pair.is_active());

        let t2 = t1 + chrono::Duration::days(14);
        pair.mark_retired(t2);
        assert_eq!(pair.status, KeyStatus::Retired);
        assert_eq!(pair.retired_at, Some(t2));
        assert!(!pair.is_verifiable());
        assert_eq!(pair.retiring_for(t2), Some(chrono::Duration::days(14)));
    }

    #[test]
    fn test_debug_redacts_private_material() {
        let pair = KeyPair::from_pem("super-secret-pem", TEST_PUBLIC_KEY);
        let debug = format!("{:?}", pair);

        assert!(!debug.contains("super-secret-pem"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains(&pair.kid));
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let pair = KeyPair::from_pem("private-pem", TEST_PUBLIC_KEY);
        let json = serde_json::to_string(&pair).unwrap();
        let restored: KeyPair = serde_json::from_str(&json).unwrap();

        assert_eq!(pair, restored);
    }
}
