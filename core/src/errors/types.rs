//! Domain-specific error types for key management and token operations
//!
//! The variants mirror the internal failure taxonomy; collaborators
//! see only the coarse response codes produced by
//! [`DomainError::to_error_response`](crate::errors::DomainError::to_error_response).

use thiserror::Error;

/// Key storage and lifecycle errors
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Key storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Key id already exists: {kid}")]
    DuplicateKeyId { kid: String },

    #[error("Key not found: {kid}")]
    KeyNotFound { kid: String },

    #[error("No active signing key")]
    NoActiveKey,

    #[error("Key generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Invalid key material: {message}")]
    InvalidKeyMaterial { message: String },
}

/// Token verification and issuance errors
///
/// Verification reports the first failing step: a token that is not
/// parseable never reports an unknown key, and an expired token with a
/// valid signature reports expiry even when it is also revoked.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Unknown signing key: {kid}")]
    UnknownKey { kid: String },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Refresh token reuse detected")]
    ReuseDetected,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType { expected: String, actual: String },

    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },

    #[error("Token generation failed: {message}")]
    GenerationFailed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_error_display() {
        let err = KeyError::DuplicateKeyId { kid: "abc123".into() };
        assert_eq!(err.to_string(), "Key id already exists: abc123");

        let err = KeyError::NoActiveKey;
        assert_eq!(err.to_string(), "No active signing key");
    }

    #[test]
    fn test_token_error_display() {
        let err = TokenError::UnknownKey { kid: "abc123".into() };
        assert_eq!(err.to_string(), "Unknown signing key: abc123");

        let err = TokenError::WrongTokenType {
            expected: "refresh".into(),
            actual: "access".into(),
        };
        assert_eq!(err.to_string(), "Wrong token type: expected refresh, got access");
    }
}
