//! # Infrastructure Layer
//!
//! Concrete backends for the Signet authentication core:
//! - **Keystore**: file backed key-set storage with atomic commits
//! - **Revocation**: Redis store sharing revocation state across processes
//! - **Discovery**: HTTP client consuming a remote JWKS endpoint
//!
//! Each backend implements the corresponding `signet_core` trait, so
//! swapping the in-memory development stores for these is a wiring
//! change only.

// Re-export core types for convenience
pub use signet_core::errors::*;

/// Durable key-set storage
pub mod keystore;

/// Remote key-set discovery
pub mod discovery;

/// Shared revocation state
pub mod revocation;

pub use discovery::HttpKeySetClient;
pub use keystore::FileKeyStore;
pub use revocation::RedisRevocationStore;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// HTTP request error for remote key-set fetches
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fetched key-set document could not be used
    #[error("Key set error: {0}")]
    KeySet(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
