//! Remote key-set discovery
//!
//! HTTP client keeping a cached copy of an authority's JWKS document,
//! so resource services in other processes can verify tokens without
//! holding any key material of their own.

pub mod client;

pub use client::HttpKeySetClient;
