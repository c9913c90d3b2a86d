//! Shared revocation state
//!
//! Redis backed [`RevocationStore`] so the authority and resource
//! processes reject the same tokens. Entries expire with the tokens
//! they deny, so Redis garbage-collects the store by itself.
//!
//! [`RevocationStore`]: signet_core::repositories::revocation::RevocationStore

pub mod redis;

pub use self::redis::RedisRevocationStore;
