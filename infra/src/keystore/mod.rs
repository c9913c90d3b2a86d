//! Durable key-set storage
//!
//! File backed implementation of the core `KeyStore` trait for
//! single-node deployments where the key set must survive restarts.

pub mod file;

#[cfg(test)]
mod tests;

pub use file::FileKeyStore;
