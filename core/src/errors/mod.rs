//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{KeyError, TokenError};

use signet_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Maps the internal taxonomy onto the collaborator-facing envelope.
    ///
    /// Verification failures collapse to a generic rejection; only the
    /// expired and revoked cases stay distinguishable so clients know
    /// whether a refresh is worth attempting.
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            DomainError::Token(TokenError::TokenExpired) => {
                ErrorResponse::new(error_codes::TOKEN_EXPIRED, "Token expired")
            }
            DomainError::Token(TokenError::TokenRevoked)
            | DomainError::Token(TokenError::ReuseDetected) => {
                ErrorResponse::new(error_codes::TOKEN_REVOKED, "Token revoked")
            }
            DomainError::Token(_) => {
                ErrorResponse::new(error_codes::UNAUTHORIZED, "Authentication rejected")
            }
            DomainError::Key(KeyError::DuplicateKeyId { kid }) => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, "Key id already exists")
                    .add_detail("kid", kid)
            }
            DomainError::Key(KeyError::KeyNotFound { kid }) => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, "Key not found")
                    .add_detail("kid", kid)
            }
            DomainError::Key(_) => {
                ErrorResponse::new(error_codes::KEY_UNAVAILABLE, "Signing keys unavailable")
            }
            DomainError::Validation { message } => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, message.clone())
            }
            DomainError::Internal { .. } => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "Internal error")
            }
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        DomainError::to_error_response(self)
    }
}
