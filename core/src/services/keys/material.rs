//! Signing and verification key handles
//!
//! Handles wrap the `jsonwebtoken` key types so token paths never touch
//! PEM text after a snapshot is built. Private material stays inside the
//! opaque [`EncodingKey`] and is absent from `Debug` output.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;

use crate::domain::entities::key_pair::{KeyAlgorithm, KeyPair};
use crate::errors::KeyError;

fn jwt_algorithm(algorithm: KeyAlgorithm) -> Algorithm {
    match algorithm {
        KeyAlgorithm::Rs256 => Algorithm::RS256,
    }
}

/// Handle for producing signatures with one key
#[derive(Clone)]
pub struct SigningKey {
    /// Key identifier stamped into token headers
    pub kid: String,
    /// JWS algorithm
    pub algorithm: Algorithm,
    /// Prepared private key
    pub encoding_key: EncodingKey,
}

impl SigningKey {
    /// Builds a signing handle from a stored key pair.
    pub fn from_key_pair(record: &KeyPair) -> Result<Self, KeyError> {
        let encoding_key = EncodingKey::from_rsa_pem(record.private_key_pem.as_bytes()).map_err(
            |e| KeyError::InvalidKeyMaterial {
                message: format!("private key for {} rejected: {}", record.kid, e),
            },
        )?;
        Ok(Self {
            kid: record.kid.clone(),
            algorithm: jwt_algorithm(record.algorithm),
            encoding_key,
        })
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Handle for checking signatures made with one key
#[derive(Clone)]
pub struct VerificationKey {
    /// Key identifier matched against JWT headers
    pub kid: String,
    /// JWS algorithm
    pub algorithm: Algorithm,
    /// Prepared public key
    pub decoding_key: DecodingKey,
}

impl VerificationKey {
    /// Builds a verification handle from a stored key pair.
    pub fn from_key_pair(record: &KeyPair) -> Result<Self, KeyError> {
        let decoding_key = DecodingKey::from_rsa_pem(record.public_key_pem.as_bytes()).map_err(
            |e| KeyError::InvalidKeyMaterial {
                message: format!("public key for {} rejected: {}", record.kid, e),
            },
        )?;
        Ok(Self {
            kid: record.kid.clone(),
            algorithm: jwt_algorithm(record.algorithm),
            decoding_key,
        })
    }

    /// Builds a verification handle from JWK modulus and exponent
    /// components, both base64url without padding.
    pub fn from_components(kid: impl Into<String>, n: &str, e: &str) -> Result<Self, KeyError> {
        let decoding_key =
            DecodingKey::from_rsa_components(n, e).map_err(|err| KeyError::InvalidKeyMaterial {
                message: format!("JWK components rejected: {}", err),
            })?;
        Ok(Self {
            kid: kid.into(),
            algorithm: Algorithm::RS256,
            decoding_key,
        })
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Extracts the RSA modulus and exponent from public PEM material as
/// base64url values for JWK documents.
///
/// Accepts SPKI (`BEGIN PUBLIC KEY`) with a fallback to PKCS#1
/// (`BEGIN RSA PUBLIC KEY`).
pub fn rsa_public_components(public_key_pem: &str) -> Result<(String, String), KeyError> {
    let public_key = RsaPublicKey::from_public_key_pem(public_key_pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_key_pem))
        .map_err(|e| KeyError::InvalidKeyMaterial {
            message: format!("public key PEM rejected: {}", e),
        })?;
    let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());
    Ok((n, e))
}
