//! Domain layer containing the entities of the authentication core.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
