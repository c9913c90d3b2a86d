//! Business services containing domain logic and use cases.

pub mod auth;
pub mod keys;
pub mod token;

// Re-export commonly used types
pub use auth::AuthService;
pub use keys::{
    DiscoveryPublisher, JwksDocument, KeyManager, KeySource, PemKeyDocument, RotationScheduler,
};
pub use token::{
    RefreshCoordinator, RevocationSweeper, TokenIssuer, TokenPolicy, TokenVerifier,
};
