//! # Signet Core
//!
//! Core domain layer of the Signet token authentication service: RSA
//! signing key lifecycle, JWT issuance and verification, refresh token
//! rotation with reuse detection, and key-set discovery documents.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::*;
pub use services::*;
pub use repositories::*;
pub use errors::*;
