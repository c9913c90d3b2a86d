pub mod key_store;
pub mod revocation;

pub use key_store::{KeyStore, MemoryKeyStore, StatusTransition};
pub use revocation::{MemoryRevocationStore, RevocationStore};
