//! Cryptographic primitives and operations
//!
//! This module provides mnemonic handling, SLIP-0010 key derivation and
//! address computation for the accounts managed by a session.

pub mod address;
pub mod keys;
pub mod mnemonic;

pub use address::*;
pub use keys::*;
pub use mnemonic::*;
