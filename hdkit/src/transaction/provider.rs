//! Collaborator interfaces
//!
//! The network, the package publisher and the transaction builder are
//! supplied by the caller. Implementations surface their own failures as
//! `Error::Network` / `Error::Execution` / `Error::Publish`; the core passes
//! them through untouched and never retries.

use std::path::Path;

use async_trait::async_trait;

use super::signer::Signer;
use super::types::{
    Balance, ExecutionResult, PublishOptions, PublishResult, Recipient, SignedTransaction,
    TransactionData,
};
use crate::crypto::address::Address;
use crate::error::{Error, Result};

/// Network access: balances, faucet and transaction execution
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Balance of `coin_type` (the native coin when `None`) held by `address`
    async fn get_balance(&self, address: &Address, coin_type: Option<&str>) -> Result<Balance>;

    /// Ask the faucet to fund `address`; `Ok(false)` when the faucet declines
    async fn request_faucet(&self, address: &Address) -> Result<bool>;

    /// Submit a signed transaction, one attempt
    async fn execute_transaction(&self, signed: &SignedTransaction) -> Result<ExecutionResult>;
}

/// Builds and publishes a package with an external toolchain
#[async_trait]
pub trait PackagePublisher: Send + Sync {
    async fn publish_package(
        &self,
        package_path: &Path,
        signer: Signer,
        options: &PublishOptions,
    ) -> Result<PublishResult>;
}

/// Composes transfer transactions consumable by the signing path
pub trait TransactionBuilder: Send + Sync {
    fn compose_transfer_transaction(&self, destination: &Address, amount: u64) -> Result<TransactionData>;

    fn compose_multi_transfer_transaction(&self, recipients: &[Recipient]) -> Result<TransactionData> {
        match recipients {
            [single] => self.compose_transfer_transaction(&single.address, single.amount),
            _ => Err(Error::InvalidAmount(format!(
                "builder does not support {} recipients",
                recipients.len()
            ))),
        }
    }
}

/// Builder for native coin transfers
#[derive(Debug, Clone, Default)]
pub struct NativeTransferBuilder {
    gas_budget: Option<u64>,
}

impl NativeTransferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a fixed gas budget to every composed transaction
    pub fn with_gas_budget(gas_budget: u64) -> Self {
        Self {
            gas_budget: Some(gas_budget),
        }
    }

    fn finish(&self, tx: TransactionData) -> TransactionData {
        match self.gas_budget {
            Some(budget) => tx.with_gas_budget(budget),
            None => tx,
        }
    }
}

impl TransactionBuilder for NativeTransferBuilder {
    fn compose_transfer_transaction(&self, destination: &Address, amount: u64) -> Result<TransactionData> {
        Ok(self.finish(TransactionData::transfer(*destination, amount)))
    }

    fn compose_multi_transfer_transaction(&self, recipients: &[Recipient]) -> Result<TransactionData> {
        Ok(self.finish(TransactionData::transfer_to_many(recipients.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;
    use crate::transaction::types::TransactionKind;

    struct SingleOnly;

    impl TransactionBuilder for SingleOnly {
        fn compose_transfer_transaction(&self, destination: &Address, amount: u64) -> Result<TransactionData> {
            Ok(TransactionData::transfer(*destination, amount))
        }
    }

    #[test]
    fn test_native_builder_applies_gas_budget() {
        let to = KeyPair::from_secret_bytes(&[5u8; 32]).address();
        let tx = NativeTransferBuilder::with_gas_budget(1_000)
            .compose_transfer_transaction(&to, 42)
            .unwrap();

        assert_eq!(tx.gas_budget, Some(1_000));
        assert_eq!(tx.sender, None);
        assert_eq!(
            tx.kind,
            TransactionKind::TransferNative {
                recipients: vec![Recipient { address: to, amount: 42 }]
            }
        );
    }

    #[test]
    fn test_default_multi_transfer_falls_back_to_single() {
        let to = KeyPair::from_secret_bytes(&[6u8; 32]).address();
        let one = [Recipient { address: to, amount: 1 }];
        assert!(SingleOnly.compose_multi_transfer_transaction(&one).is_ok());

        let two = [one[0], Recipient { address: to, amount: 2 }];
        assert!(matches!(
            SingleOnly.compose_multi_transfer_transaction(&two),
            Err(Error::InvalidAmount(_))
        ));
    }
}
