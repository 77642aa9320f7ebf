//! Key derivation and management
//!
//! Derivation paths, ed25519 key pairs and the pure derivation engine that
//! maps a seed and path onto a key pair.

mod derivation;
mod keypair;
mod path;

pub use derivation::*;
pub use keypair::*;
pub use path::*;
