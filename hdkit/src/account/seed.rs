//! Master secret storage

use std::fmt;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::keys::{derive_key_pair, DerivePathParams, KeyPair};
use crate::crypto::mnemonic::{generate_mnemonic, mnemonic_to_seed, MnemonicStrength};
use crate::error::Result;

enum SeedSource {
    Mnemonic {
        phrase: Zeroizing<String>,
        seed: Zeroizing<[u8; 64]>,
    },
    SecretKey(KeyPair),
}

/// Owner of the master secret.
///
/// A mnemonic-backed store derives a distinct key pair per path. A store
/// built from a raw secret key has no key tree: every valid path resolves to
/// the same key pair.
pub struct SeedStore {
    source: SeedSource,
}

impl SeedStore {
    /// Create a store from a 12 or 24 word mnemonic
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        let seed = mnemonic_to_seed(phrase, None)?;
        let phrase = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));

        Ok(Self {
            source: SeedSource::Mnemonic { phrase, seed },
        })
    }

    /// Create a store from a hex or base64 encoded secret key
    pub fn from_secret_key(encoded: &str) -> Result<Self> {
        let key_pair = KeyPair::from_encoded_secret(encoded)?;
        Ok(Self {
            source: SeedSource::SecretKey(key_pair),
        })
    }

    /// Create a store around a freshly generated 24 word mnemonic
    pub fn generate() -> Result<Self> {
        let phrase = generate_mnemonic(MnemonicStrength::Words24)?;
        Self::from_mnemonic(&phrase)
    }

    /// Pick the seed source from optional inputs.
    ///
    /// The mnemonic wins when both are present; with neither a new mnemonic
    /// is generated.
    pub fn from_parts(mnemonics: Option<&str>, secret_key: Option<&str>) -> Result<Self> {
        let mnemonics = mnemonics.filter(|m| !m.trim().is_empty());
        let secret_key = secret_key.filter(|s| !s.trim().is_empty());

        match (mnemonics, secret_key) {
            (Some(phrase), ignored) => {
                if ignored.is_some() {
                    warn!("Both mnemonic and secret key supplied; ignoring the secret key");
                }
                Self::from_mnemonic(phrase)
            }
            (None, Some(encoded)) => Self::from_secret_key(encoded),
            (None, None) => {
                debug!("No master secret supplied; generating a 24 word mnemonic");
                Self::generate()
            }
        }
    }

    /// Whether derivation follows a key tree (mnemonic-backed)
    pub fn is_hierarchical(&self) -> bool {
        matches!(self.source, SeedSource::Mnemonic { .. })
    }

    /// The mnemonic phrase, if this store is mnemonic-backed
    pub fn mnemonic(&self) -> Option<&str> {
        match &self.source {
            SeedSource::Mnemonic { phrase, .. } => Some(phrase.as_str()),
            SeedSource::SecretKey(_) => None,
        }
    }

    /// Derive the key pair for `path`. Pure: no state is read or written
    /// beyond the immutable seed.
    pub fn derive(&self, path: &DerivePathParams) -> Result<KeyPair> {
        match &self.source {
            SeedSource::Mnemonic { seed, .. } => derive_key_pair(&seed[..], path),
            SeedSource::SecretKey(key_pair) => {
                if *path != DerivePathParams::default() {
                    debug!(%path, "Secret key store ignores derivation path");
                }
                Ok(key_pair.clone())
            }
        }
    }
}

impl fmt::Debug for SeedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.source {
            SeedSource::Mnemonic { .. } => "mnemonic",
            SeedSource::SecretKey(_) => "secret_key",
        };
        f.debug_struct("SeedStore").field("source", &kind).finish()
    }
}
