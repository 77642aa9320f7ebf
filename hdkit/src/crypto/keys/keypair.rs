//! Ed25519 key pairs

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::address::Address;
use crate::error::{Error, Result};

/// Signature scheme flag for ed25519 keys
pub const ED25519_FLAG: u8 = 0x00;

/// A 32-byte ed25519 public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Get the raw public key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive the network address for this key
    pub fn to_address(&self) -> Address {
        Address::from_public_key(self)
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

/// An ed25519 key pair held only in memory.
///
/// The signing key is zeroized when dropped and never appears in `Debug`
/// output.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Create a key pair from a 32-byte secret scalar seed
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Decode a secret key given as hex (optionally `0x`-prefixed) or base64.
    ///
    /// Accepted layouts are 32 raw bytes, 33 bytes led by the ed25519 flag,
    /// and 64 bytes of secret followed by the matching public key.
    pub fn from_encoded_secret(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(Error::InvalidSecretKey("empty secret key".to_string()));
        }

        let bytes = Zeroizing::new(decode_secret(encoded)?);
        let secret: &[u8] = match bytes.len() {
            32 => &bytes[..],
            33 if bytes[0] == ED25519_FLAG => &bytes[1..],
            33 => {
                return Err(Error::InvalidSecretKey(format!(
                    "unsupported key scheme flag 0x{:02x}",
                    bytes[0]
                )))
            }
            64 => &bytes[..32],
            n => {
                return Err(Error::InvalidSecretKey(format!(
                    "expected 32, 33 or 64 bytes, got {}",
                    n
                )))
            }
        };

        let mut raw = Zeroizing::new([0u8; 32]);
        raw.copy_from_slice(secret);
        let key_pair = Self::from_secret_bytes(&raw);

        if bytes.len() == 64 && key_pair.public_key().as_bytes()[..] != bytes[32..] {
            return Err(Error::InvalidSecretKey(
                "public half does not match secret".to_string(),
            ));
        }

        Ok(key_pair)
    }

    /// Get the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(self.signing_key.verifying_key())
    }

    /// Get the network address of this key pair
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing_key.verifying_key().verify(message, signature).is_ok()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key().as_bytes()))
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn decode_secret(encoded: &str) -> Result<Vec<u8>> {
    let hex_body = encoded.strip_prefix("0x").unwrap_or(encoded);
    if hex_body.len() % 2 == 0 && hex_body.chars().all(|c| c.is_ascii_hexdigit()) {
        return hex::decode(hex_body).map_err(|e| Error::InvalidSecretKey(e.to_string()));
    }

    BASE64
        .decode(encoded)
        .map_err(|e| Error::InvalidSecretKey(format!("not valid hex or base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    #[test]
    fn test_hex_and_base64_agree() {
        let from_hex = KeyPair::from_encoded_secret(SECRET_HEX).unwrap();
        let from_prefixed = KeyPair::from_encoded_secret(&format!("0x{}", SECRET_HEX)).unwrap();

        let raw = hex::decode(SECRET_HEX).unwrap();
        let from_b64 = KeyPair::from_encoded_secret(&BASE64.encode(&raw)).unwrap();

        let mut flagged = vec![ED25519_FLAG];
        flagged.extend_from_slice(&raw);
        let from_flagged = KeyPair::from_encoded_secret(&BASE64.encode(&flagged)).unwrap();

        assert_eq!(from_hex.public_key(), from_prefixed.public_key());
        assert_eq!(from_hex.public_key(), from_b64.public_key());
        assert_eq!(from_hex.public_key(), from_flagged.public_key());
    }

    #[test]
    fn test_rfc8032_public_key() {
        // RFC 8032 section 7.1, test 1
        let key_pair = KeyPair::from_encoded_secret(SECRET_HEX).unwrap();
        assert_eq!(
            hex::encode(key_pair.public_key().as_bytes()),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
    }

    #[test]
    fn test_keypair_layout() {
        let key_pair = KeyPair::from_encoded_secret(SECRET_HEX).unwrap();
        let mut full = hex::decode(SECRET_HEX).unwrap();
        full.extend_from_slice(key_pair.public_key().as_bytes());
        assert!(KeyPair::from_encoded_secret(&hex::encode(&full)).is_ok());

        full[40] ^= 0xff;
        assert!(matches!(
            KeyPair::from_encoded_secret(&hex::encode(&full)),
            Err(Error::InvalidSecretKey(_))
        ));
    }

    #[test]
    fn test_rejects_malformed() {
        let short = "ab".repeat(31);
        for bad in ["", "zz", "abcd", "not base64 at all!", short.as_str()] {
            assert!(matches!(
                KeyPair::from_encoded_secret(bad),
                Err(Error::InvalidSecretKey(_))
            ), "{}", bad);
        }

        let mut wrong_flag = vec![0x01u8];
        wrong_flag.extend_from_slice(&[7u8; 32]);
        assert!(KeyPair::from_encoded_secret(&BASE64.encode(&wrong_flag)).is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let key_pair = KeyPair::from_secret_bytes(&[9u8; 32]);
        let signature = key_pair.sign(b"payload");
        assert!(key_pair.verify(b"payload", &signature));
        assert!(!key_pair.verify(b"other", &signature));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let key_pair = KeyPair::from_encoded_secret(SECRET_HEX).unwrap();
        let rendered = format!("{:?}", key_pair);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(SECRET_HEX));
    }
}
