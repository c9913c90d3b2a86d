//! Signing key lifecycle services
//!
//! Key generation, rotation, discovery documents, and the trait that
//! hands verification keys to the token layer.

pub mod config;
pub mod discovery;
pub mod manager;
pub mod material;
pub mod scheduler;
pub mod traits;

pub use config::RotationPolicy;
pub use discovery::{DiscoveryPublisher, Jwk, JwksDocument, PemKeyDocument};
pub use manager::{KeyManager, KeySetSnapshot, RotationOutcome};
pub use material::{SigningKey, VerificationKey};
pub use scheduler::{RotationScheduleConfig, RotationScheduler};
pub use traits::KeySource;

#[cfg(test)]
mod tests;
