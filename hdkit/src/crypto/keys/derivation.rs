//! SLIP-0010 ed25519 key derivation
//!
//! Every level of the account path is hardened; ed25519 has no public
//! child derivation.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use super::keypair::KeyPair;
use super::path::{DerivePathParams, HARDENED_OFFSET};
use crate::error::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for master key generation
const MASTER_HMAC_KEY: &[u8] = b"ed25519 seed";

/// Derive the key pair at `path` from a BIP-39 seed.
///
/// Pure function of its inputs. The path must already be within the
/// hardened range; callers validate it at the operation boundary.
pub fn derive_key_pair(seed: &[u8], path: &DerivePathParams) -> Result<KeyPair> {
    if path.validate().is_err() {
        return Err(Error::KeyDerivation(format!("unvalidated path reached derivation: {:?}", path)));
    }
    derive_from_indices(seed, &path.indices())
}

/// Derive along raw (unhardened) indices; the hardened offset is applied here
pub(crate) fn derive_from_indices(seed: &[u8], indices: &[u32]) -> Result<KeyPair> {
    let (mut key, mut chain_code) = derive_master_key(seed)?;

    for &index in indices {
        let (child_key, child_chain_code) = derive_child_key(&key, &chain_code, index)?;
        key.zeroize();
        chain_code.zeroize();
        key = child_key;
        chain_code = child_chain_code;
    }

    let key_pair = KeyPair::from_secret_bytes(&key);
    key.zeroize();
    chain_code.zeroize();

    Ok(key_pair)
}

/// Derive the master key and chain code from a seed
fn derive_master_key(seed: &[u8]) -> Result<([u8; 32], [u8; 32])> {
    let output = hmac_sha512(MASTER_HMAC_KEY, seed)?;
    Ok(split_output(&output))
}

/// Derive a hardened child key from a parent key
fn derive_child_key(
    parent_key: &[u8; 32],
    parent_chain_code: &[u8; 32],
    index: u32,
) -> Result<([u8; 32], [u8; 32])> {
    // 0x00 || parent_key || ser32(index | 2^31)
    let mut data = Zeroizing::new([0u8; 37]);
    data[1..33].copy_from_slice(parent_key);
    data[33..].copy_from_slice(&(index | HARDENED_OFFSET).to_be_bytes());

    let output = hmac_sha512(parent_chain_code, &data[..])?;
    Ok(split_output(&output))
}

fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<Zeroizing<[u8; 64]>> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| Error::KeyDerivation(format!("HMAC error: {}", e)))?;
    mac.update(data);

    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}

fn split_output(output: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&output[..32]);
    chain_code.copy_from_slice(&output[32..]);
    (key, chain_code)
}
