//! Domain entities representing keys, tokens, and revocation state.

pub mod key_pair;
pub mod revocation;
pub mod token;

// Re-export commonly used types
pub use key_pair::{KeyAlgorithm, KeyPair, KeyStatus};
pub use revocation::{FamilyStatus, RevocationEntry, RevocationId, RevocationReason};
pub use token::{Claims, TokenPair, TokenType, VerifiedToken};
