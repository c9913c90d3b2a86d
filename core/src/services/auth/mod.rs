//! Authentication facade
//!
//! One service owning the whole token stack: issuance, verification,
//! refresh rotation, key rotation, and discovery documents.

mod service;

#[cfg(test)]
mod tests;

pub use service::AuthService;
