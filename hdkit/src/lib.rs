//! hdkit - HD account session and transaction-signing kit
//!
//! This library lets a caller hold one master secret (a mnemonic or a raw
//! secret key) and transact as any account derived from it: SLIP-0010 key
//! derivation, a "current account" session with per-call overrides, single-use
//! signers and the orchestration of sign-then-submit flows.

pub mod error;
pub mod config;
pub mod crypto;
pub mod account;
pub mod transaction;
pub mod telemetry;

// Re-export commonly used types for convenience
pub use account::{AccountSession, SeedStore};
pub use config::{KitConfig, NetworkType};
pub use crypto::{Address, DerivePathParams, KeyPair};
pub use error::{Error, Result};
pub use transaction::{Signer, SignerFactory, TransactionOrchestrator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
