//! Transaction functionality
//!
//! This module provides signers, collaborator interfaces and the
//! orchestrator that sequences signing and submission for derived accounts.

pub mod types;
pub mod provider;
pub mod rpc;
mod signer;
mod orchestrator;

pub use types::*;
pub use provider::*;
pub use signer::*;
pub use orchestrator::*;
