//! Token service module
//!
//! This module handles all token-related operations:
//! - RS256 access and refresh token issuance
//! - Ordered verification against the live key set
//! - Refresh rotation with family-level reuse detection
//! - Background cleanup of expired revocation entries

pub mod cleanup;
pub mod config;
pub mod issuer;
pub mod refresh;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use cleanup::{RevocationSweeper, SweeperConfig};
pub use config::TokenPolicy;
pub use issuer::{IssuedToken, TokenIssuer};
pub use refresh::RefreshCoordinator;
pub use verifier::TokenVerifier;
