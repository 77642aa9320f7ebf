//! Error types for the hdkit library

use thiserror::Error;

/// Custom error type for hdkit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Derivation failed on input that already passed validation.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error was raised by boundary validation, before any I/O.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidMnemonic(_)
                | Self::InvalidSecretKey(_)
                | Self::InvalidPath(_)
                | Self::InvalidAddress(_)
                | Self::InvalidAmount(_)
        )
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type for hdkit operations
pub type Result<T> = std::result::Result<T, Error>;
