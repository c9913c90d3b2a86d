pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::MemoryKeyStore;
pub use r#trait::{KeyStore, StatusTransition};

#[cfg(test)]
mod tests;
