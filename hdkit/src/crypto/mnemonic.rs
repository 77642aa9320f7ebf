//! Mnemonic phrase generation and handling

use bip39::Mnemonic;
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};

/// Supported mnemonic strengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicStrength {
    /// 12 words (128 bits)
    Words12,
    /// 24 words (256 bits)
    Words24,
}

impl MnemonicStrength {
    /// Get entropy length in bytes
    fn entropy_bytes(&self) -> usize {
        match self {
            Self::Words12 => 16,
            Self::Words24 => 32,
        }
    }

    /// Map a word count onto a supported strength
    pub fn from_word_count(count: usize) -> Option<Self> {
        match count {
            12 => Some(Self::Words12),
            24 => Some(Self::Words24),
            _ => None,
        }
    }
}

/// Generate a new random mnemonic phrase with the specified strength
pub fn generate_mnemonic(strength: MnemonicStrength) -> Result<Zeroizing<String>> {
    let mut entropy = vec![0u8; strength.entropy_bytes()];
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| Error::InvalidMnemonic(e.to_string()));
    entropy.zeroize();

    Ok(Zeroizing::new(mnemonic?.to_string()))
}

/// Parse a mnemonic phrase, accepting only 12 or 24 words with a valid checksum
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic> {
    let words = phrase.split_whitespace().count();
    if MnemonicStrength::from_word_count(words).is_none() {
        return Err(Error::InvalidMnemonic(format!(
            "expected 12 or 24 words, got {}",
            words
        )));
    }

    Mnemonic::parse_normalized(phrase).map_err(|e| Error::InvalidMnemonic(e.to_string()))
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> Result<bool> {
    parse_mnemonic(phrase).map(|_| true)
}

/// Generate a seed from a mnemonic phrase and optional passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: Option<&str>) -> Result<Zeroizing<[u8; 64]>> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed(passphrase.unwrap_or(""))))
}
