//! Current-account session

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use super::seed::SeedStore;
use crate::crypto::address::Address;
use crate::crypto::keys::{DerivePathParams, IntoDerivePath, KeyPair};
use crate::error::Result;

/// Tracks which derived account is "current" for a seed.
///
/// The only mutable state is the current path. Every operation takes one
/// snapshot of it, so a concurrent `switch_account` never tears a read.
/// Key pairs and addresses are recomputed on demand and never cached.
#[derive(Debug)]
pub struct AccountSession {
    seed: Arc<SeedStore>,
    current_path: RwLock<DerivePathParams>,
}

impl AccountSession {
    /// Create a session positioned at the default path
    pub fn new(seed: Arc<SeedStore>) -> Self {
        Self::with_path(seed, DerivePathParams::default())
    }

    /// Create a session positioned at `path`.
    ///
    /// `path` is not validated here; the first operation resolving it will
    /// reject an out-of-range path.
    pub fn with_path(seed: Arc<SeedStore>, path: DerivePathParams) -> Self {
        Self {
            seed,
            current_path: RwLock::new(path),
        }
    }

    /// The seed this session derives from
    pub fn seed(&self) -> &Arc<SeedStore> {
        &self.seed
    }

    /// Snapshot of the current path
    pub fn current_path(&self) -> DerivePathParams {
        *self.current_path.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the effective path for an operation: the override if given,
    /// otherwise the current path. The result is always validated.
    pub fn resolve_path(&self, path: Option<DerivePathParams>) -> Result<DerivePathParams> {
        let resolved = path.unwrap_or_else(|| self.current_path());
        resolved.validate()?;
        Ok(resolved)
    }

    /// Derive the key pair for `path`, or for the current path when omitted.
    /// An explicit path never changes the current one.
    pub fn get_key_pair(&self, path: Option<DerivePathParams>) -> Result<KeyPair> {
        let resolved = self.resolve_path(path)?;
        self.seed.derive(&resolved)
    }

    /// Address for `path`, or for the current path when omitted
    pub fn get_address(&self, path: Option<DerivePathParams>) -> Result<Address> {
        Ok(self.get_key_pair(path)?.address())
    }

    /// Address of the current path at the moment of the call
    pub fn current_address(&self) -> Result<Address> {
        self.get_address(None)
    }

    /// Make `path` the current path.
    ///
    /// Validation happens before the lock is taken; on error the current
    /// path is left exactly as it was.
    pub fn switch_account(&self, path: impl IntoDerivePath) -> Result<()> {
        let path = path.into_derive_path()?;

        let previous = {
            let mut current = self.current_path.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, path)
        };

        if previous != path {
            info!(from = %previous, to = %path, "Switched account");
        } else {
            debug!(%path, "Switch to the already current account");
        }
        Ok(())
    }
}
