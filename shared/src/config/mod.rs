//! Configuration module for the authentication core
//!
//! Configuration is read from environment variables with documented
//! defaults; cross-field constraints are checked once at startup via
//! [`AuthConfig::validate`].

pub mod auth;

// Re-export commonly used types
pub use auth::{AuthConfig, DiscoveryConfig, RotationConfig, TokenConfig};
