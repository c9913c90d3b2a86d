//! Shared configuration and common types for the Signet authentication core
//!
//! This crate provides the pieces used across the workspace members:
//! - Configuration types with environment loading and startup validation
//! - The error response envelope returned to collaborators

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{AuthConfig, DiscoveryConfig, RotationConfig, TokenConfig};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
