//! Account addresses

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::crypto::keys::{PublicKey, ED25519_FLAG};
use crate::error::{Error, Result};

/// BLAKE2b with a 32-byte output, the hash behind addresses and signing digests
pub(crate) type Blake2b256 = Blake2b<U32>;

/// Length of an address in bytes
pub const ADDRESS_LENGTH: usize = 32;

/// A 32-byte account address, rendered as `0x` followed by 64 hex digits
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// BLAKE2b-256 over the scheme flag followed by the public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update([ED25519_FLAG]);
        hasher.update(public_key.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Get the raw address bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

/// Whether `value` is a well-formed address string
pub fn is_valid_address(value: &str) -> bool {
    value.parse::<Address>().is_ok()
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let body = value
            .strip_prefix("0x")
            .ok_or_else(|| Error::InvalidAddress(format!("missing 0x prefix: {}", value)))?;

        if body.len() != ADDRESS_LENGTH * 2 {
            return Err(Error::InvalidAddress(format!(
                "expected {} hex digits, got {}",
                ADDRESS_LENGTH * 2,
                body.len()
            )));
        }

        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(body, &mut bytes)
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", value, e)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let value = String::deserialize(deserializer)?;
            value.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Self)
        }
    }
}
