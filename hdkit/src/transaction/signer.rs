//! Single-use signers

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::provider::NetworkProvider;
use super::types::{signing_digest, ExecutionResult, SignedTransaction, TransactionData, SIGNATURE_LENGTH};
use crate::account::AccountSession;
use crate::crypto::address::Address;
use crate::crypto::keys::{DerivePathParams, KeyPair, PublicKey, ED25519_FLAG};
use crate::error::{Error, Result};

/// A capability to sign as one derived account.
///
/// Consumed by the call that uses it; not `Clone` and not serializable.
pub struct Signer {
    key_pair: KeyPair,
    path: DerivePathParams,
    network: Arc<dyn NetworkProvider>,
}

impl Signer {
    pub(crate) fn new(key_pair: KeyPair, path: DerivePathParams, network: Arc<dyn NetworkProvider>) -> Self {
        Self {
            key_pair,
            path,
            network,
        }
    }

    pub fn address(&self) -> Address {
        self.key_pair.address()
    }

    pub fn public_key(&self) -> PublicKey {
        self.key_pair.public_key()
    }

    /// The path this signer was derived from
    pub fn path(&self) -> DerivePathParams {
        self.path
    }

    /// Sign `tx`, attributing it to this signer when it has no sender.
    ///
    /// A transaction naming a different sender is rejected.
    pub fn sign(self, tx: TransactionData) -> Result<SignedTransaction> {
        self.sign_data(tx)
    }

    /// Sign `tx` and submit it through the network collaborator
    pub async fn sign_and_execute(self, tx: TransactionData) -> Result<ExecutionResult> {
        let signed = self.sign_data(tx)?;
        self.network.execute_transaction(&signed).await
    }

    /// Whether `signed` carries a valid signature by this signer's key
    pub fn verify(&self, signed: &SignedTransaction) -> bool {
        signed.verify().is_ok() && &signed.signature()[65..] == self.public_key().as_bytes()
    }

    fn sign_data(&self, mut tx: TransactionData) -> Result<SignedTransaction> {
        let address = self.address();
        match tx.sender {
            None => tx.sender = Some(address),
            Some(sender) if sender == address => {}
            Some(sender) => {
                return Err(Error::Signing(format!(
                    "transaction sender {} does not match signer {}",
                    sender, address
                )))
            }
        }

        let tx_bytes = tx.to_bytes()?;
        let signature = self.key_pair.sign(&signing_digest(&tx_bytes));

        let mut serialized = Vec::with_capacity(SIGNATURE_LENGTH);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(self.public_key().as_bytes());

        debug!(%address, path = %self.path, "Signed transaction");
        Ok(SignedTransaction::new(tx_bytes, serialized))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Produces signers bound to the session's seed and a network provider
#[derive(Clone)]
pub struct SignerFactory {
    session: Arc<AccountSession>,
    network: Arc<dyn NetworkProvider>,
}

impl SignerFactory {
    pub fn new(session: Arc<AccountSession>, network: Arc<dyn NetworkProvider>) -> Self {
        Self { session, network }
    }

    /// Signer for `path`, or for the current path when omitted.
    /// Never changes the session's current path.
    pub fn create_signer(&self, path: Option<DerivePathParams>) -> Result<Signer> {
        let resolved = self.session.resolve_path(path)?;
        let key_pair = self.session.seed().derive(&resolved)?;
        Ok(Signer::new(key_pair, resolved, Arc::clone(&self.network)))
    }
}

impl fmt::Debug for SignerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerFactory")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
