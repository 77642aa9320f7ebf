//! Common transaction types

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
use serde::{Deserialize, Serialize};
use blake2::Digest;

use crate::crypto::address::{Address, Blake2b256};
use crate::crypto::keys::{PublicKey, ED25519_FLAG};
use crate::error::{Error, Result};

/// Intent prefix for transaction data: scope, version, app id
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Length of a serialized signature: flag, 64-byte signature, 32-byte key
pub const SIGNATURE_LENGTH: usize = 1 + 64 + 32;

/// A single transfer recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: Address,
    pub amount: u64,
}

/// What a transaction does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Transfer of the native coin to one or more recipients
    TransferNative { recipients: Vec<Recipient> },
    /// Pre-built programmable transaction payload
    Programmable { bytes: Vec<u8> },
}

/// Unsigned transaction data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    /// Sender; filled in with the signer's address when absent
    pub sender: Option<Address>,
    /// Gas budget in the smallest coin unit
    pub gas_budget: Option<u64>,
    pub kind: TransactionKind,
}

impl TransactionData {
    /// A transfer of `amount` to a single recipient
    pub fn transfer(recipient: Address, amount: u64) -> Self {
        Self::transfer_to_many(vec![Recipient {
            address: recipient,
            amount,
        }])
    }

    /// A transfer split across several recipients
    pub fn transfer_to_many(recipients: Vec<Recipient>) -> Self {
        Self {
            sender: None,
            gas_budget: None,
            kind: TransactionKind::TransferNative { recipients },
        }
    }

    /// Wrap an externally built payload
    pub fn programmable(bytes: Vec<u8>) -> Self {
        Self {
            sender: None,
            gas_budget: None,
            kind: TransactionKind::Programmable { bytes },
        }
    }

    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_gas_budget(mut self, gas_budget: u64) -> Self {
        self.gas_budget = Some(gas_budget);
        self
    }

    /// Canonical byte encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the canonical byte encoding
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Digest that gets signed: BLAKE2b-256 over the intent prefix and the bytes
pub fn signing_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(TRANSACTION_INTENT);
    hasher.update(tx_bytes);
    hasher.finalize().into()
}

/// Transaction bytes together with a serialized signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx_bytes: Vec<u8>,
    signature: Vec<u8>,
}

impl SignedTransaction {
    pub(crate) fn new(tx_bytes: Vec<u8>, signature: Vec<u8>) -> Self {
        Self { tx_bytes, signature }
    }

    pub fn tx_bytes(&self) -> &[u8] {
        &self.tx_bytes
    }

    /// Flag, signature and public key
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Base64 encoded transaction bytes, as submitted to a node
    pub fn tx_bytes_base64(&self) -> String {
        BASE64.encode(&self.tx_bytes)
    }

    /// Base64 encoded serialized signature
    pub fn signature_base64(&self) -> String {
        BASE64.encode(&self.signature)
    }

    /// Decode the signed transaction data
    pub fn data(&self) -> Result<TransactionData> {
        TransactionData::from_bytes(&self.tx_bytes)
    }

    /// Check the signature and that it was made by the declared sender
    pub fn verify(&self) -> Result<()> {
        if self.signature.len() != SIGNATURE_LENGTH || self.signature[0] != ED25519_FLAG {
            return Err(Error::Signing("malformed serialized signature".to_string()));
        }

        let mut sig_bytes = [0u8; 64];
        sig_bytes.copy_from_slice(&self.signature[1..65]);
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&self.signature[65..]);

        let verifying_key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| Error::Signing(format!("invalid public key: {}", e)))?;
        let signature = Signature::from_bytes(&sig_bytes);
        verifying_key
            .verify(&signing_digest(&self.tx_bytes), &signature)
            .map_err(|e| Error::Signing(format!("signature check failed: {}", e)))?;

        let signer = PublicKey::from(verifying_key).to_address();
        match self.data()?.sender {
            Some(sender) if sender == signer => Ok(()),
            Some(sender) => Err(Error::Signing(format!(
                "signed by {} but sender is {}",
                signer, sender
            ))),
            None => Err(Error::Signing("transaction has no sender".to_string())),
        }
    }
}

/// Outcome reported by the network for an executed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

/// Result of submitting a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Transaction digest
    pub digest: String,
    pub status: ExecutionStatus,
    pub gas_used: Option<u64>,
}

/// Balance of one coin type for an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub coin_type: String,
    pub coin_object_count: u64,
    pub total_balance: u128,
}

/// Options handed to a package publisher without interpretation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishOptions {
    pub gas_budget: Option<u64>,
    pub skip_fetch_latest_git_deps: bool,
    pub with_unpublished_dependencies: bool,
    /// Extra flags passed through to the build toolchain
    pub extra_args: Vec<String>,
}

/// Result of publishing a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub digest: String,
    pub package_id: Option<String>,
    pub status: ExecutionStatus,
}

/// Why a faucet request did not fund the account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetFailure {
    /// The faucet answered but refused
    Declined,
    /// The request itself failed
    Errored(String),
}

/// Outcome of a faucet request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetOutcome {
    Funded,
    Failed(FaucetFailure),
}

impl FaucetOutcome {
    pub fn is_funded(&self) -> bool {
        matches!(self, Self::Funded)
    }
}
