//! Transaction orchestration over a derived-account session

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::provider::{NativeTransferBuilder, NetworkProvider, PackagePublisher, TransactionBuilder};
use super::signer::{Signer, SignerFactory};
use super::types::{
    Balance, ExecutionResult, FaucetFailure, FaucetOutcome, PublishOptions, PublishResult,
    Recipient, SignedTransaction, TransactionData,
};
use crate::account::{AccountSession, SeedStore};
use crate::config::KitConfig;
use crate::crypto::address::Address;
use crate::crypto::keys::{DerivePathParams, IntoDerivePath, KeyPair};
use crate::error::{Error, Result};

/// Signs and submits transactions as any account derived from one seed.
///
/// Every operation taking `path: Option<DerivePathParams>` acts on the
/// session's current account when `path` is `None` and never changes the
/// current account when it is `Some`. Inputs are validated before any
/// collaborator is called.
pub struct TransactionOrchestrator {
    session: Arc<AccountSession>,
    signers: SignerFactory,
    network: Arc<dyn NetworkProvider>,
    publisher: Option<Arc<dyn PackagePublisher>>,
    builder: Arc<dyn TransactionBuilder>,
}

impl TransactionOrchestrator {
    /// Create an orchestrator around `seed`, positioned at the default path
    pub fn new(seed: SeedStore, network: Arc<dyn NetworkProvider>) -> Self {
        let session = Arc::new(AccountSession::new(Arc::new(seed)));
        let signers = SignerFactory::new(Arc::clone(&session), Arc::clone(&network));

        Self {
            session,
            signers,
            network,
            publisher: None,
            builder: Arc::new(NativeTransferBuilder::new()),
        }
    }

    /// Create an orchestrator from configuration.
    ///
    /// The mnemonic wins over the secret key; with neither a fresh mnemonic
    /// is generated and can be read back through [`Self::mnemonic`].
    pub fn from_config(config: &KitConfig, network: Arc<dyn NetworkProvider>) -> Result<Self> {
        let seed = SeedStore::from_parts(config.mnemonics.as_deref(), config.secret_key.as_deref())?;
        info!(network = %config.network_type, hierarchical = seed.is_hierarchical(), "Created account kit");
        Ok(Self::new(seed, network))
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn PackagePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_builder(mut self, builder: Arc<dyn TransactionBuilder>) -> Self {
        self.builder = builder;
        self
    }

    /// The account session shared with this orchestrator's signers
    pub fn session(&self) -> &Arc<AccountSession> {
        &self.session
    }

    /// The mnemonic backing this kit, if any
    pub fn mnemonic(&self) -> Option<&str> {
        self.session.seed().mnemonic()
    }

    pub fn current_path(&self) -> DerivePathParams {
        self.session.current_path()
    }

    pub fn get_key_pair(&self, path: Option<DerivePathParams>) -> Result<KeyPair> {
        self.session.get_key_pair(path)
    }

    pub fn switch_account(&self, path: impl IntoDerivePath) -> Result<()> {
        self.session.switch_account(path)
    }

    pub fn get_address(&self, path: Option<DerivePathParams>) -> Result<Address> {
        self.session.get_address(path)
    }

    pub fn current_address(&self) -> Result<Address> {
        self.session.current_address()
    }

    /// Single-use signer for `path` or the current account
    pub fn create_signer(&self, path: Option<DerivePathParams>) -> Result<Signer> {
        self.signers.create_signer(path)
    }

    /// Balance of `coin_type` (native coin when `None`) for the resolved account
    #[instrument(skip(self), err)]
    pub async fn get_balance(
        &self,
        coin_type: Option<&str>,
        path: Option<DerivePathParams>,
    ) -> Result<Balance> {
        let address = self.session.get_address(path)?;
        self.network.get_balance(&address, coin_type).await
    }

    /// Sign `tx` as the resolved account without submitting it
    pub fn sign_transaction(
        &self,
        tx: TransactionData,
        path: Option<DerivePathParams>,
    ) -> Result<SignedTransaction> {
        self.create_signer(path)?.sign(tx)
    }

    /// Sign `tx` and submit it; network results and errors pass through unchanged
    #[instrument(skip(self, tx), err)]
    pub async fn sign_and_submit(
        &self,
        tx: TransactionData,
        path: Option<DerivePathParams>,
    ) -> Result<ExecutionResult> {
        let signer = self.create_signer(path)?;
        let sender = signer.address();

        let result = signer.sign_and_execute(tx).await?;
        info!(%sender, digest = %result.digest, status = ?result.status, "Transaction executed");
        Ok(result)
    }

    /// Transfer `amount` of the native coin to `destination`.
    ///
    /// Fails with `InvalidAddress` / `InvalidAmount` before touching the
    /// network.
    #[instrument(skip(self), err)]
    pub async fn compose_and_send_transfer(
        &self,
        destination: &str,
        amount: u64,
        path: Option<DerivePathParams>,
    ) -> Result<ExecutionResult> {
        let recipient = validate_recipient(destination, amount)?;
        let path = Some(self.session.resolve_path(path)?);

        let tx = self
            .builder
            .compose_transfer_transaction(&recipient.address, recipient.amount)?;
        self.sign_and_submit(tx, path).await
    }

    /// Transfer to several recipients in one transaction; every recipient is
    /// validated before the network is touched
    #[instrument(skip(self, recipients), fields(count = recipients.len()), err)]
    pub async fn compose_and_send_transfer_to_many(
        &self,
        recipients: &[(&str, u64)],
        path: Option<DerivePathParams>,
    ) -> Result<ExecutionResult> {
        if recipients.is_empty() {
            return Err(Error::InvalidAmount("no recipients given".to_string()));
        }

        let recipients = recipients
            .iter()
            .map(|(destination, amount)| validate_recipient(destination, *amount))
            .collect::<Result<Vec<_>>>()?;
        let path = Some(self.session.resolve_path(path)?);

        let tx = self.builder.compose_multi_transfer_transaction(&recipients)?;
        self.sign_and_submit(tx, path).await
    }

    /// Hand a signer and the package location to the package publisher
    #[instrument(skip(self, package_path, options), fields(package = %package_path.as_ref().display()), err)]
    pub async fn publish_package(
        &self,
        package_path: impl AsRef<Path>,
        options: &PublishOptions,
        path: Option<DerivePathParams>,
    ) -> Result<PublishResult> {
        let publisher = self
            .publisher
            .as_ref()
            .ok_or_else(|| Error::Publish("no package publisher configured".to_string()))?;
        let signer = self.create_signer(path)?;

        publisher
            .publish_package(package_path.as_ref(), signer, options)
            .await
    }

    /// Ask the faucet to fund the resolved account, keeping the failure kind.
    ///
    /// Only an invalid `path` is returned as an error.
    pub async fn request_faucet(&self, path: Option<DerivePathParams>) -> Result<FaucetOutcome> {
        let address = self.session.get_address(path)?;

        let outcome = match self.network.request_faucet(&address).await {
            Ok(true) => FaucetOutcome::Funded,
            Ok(false) => FaucetOutcome::Failed(FaucetFailure::Declined),
            Err(e) => FaucetOutcome::Failed(FaucetFailure::Errored(e.to_string())),
        };

        match &outcome {
            FaucetOutcome::Funded => info!(%address, "Faucet funded account"),
            FaucetOutcome::Failed(reason) => warn!(%address, ?reason, "Faucet request failed"),
        }
        Ok(outcome)
    }

    /// Best-effort faucet request: `false` on any faucet failure
    pub async fn request_faucet_funds(&self, path: Option<DerivePathParams>) -> Result<bool> {
        Ok(self.request_faucet(path).await?.is_funded())
    }
}

fn validate_recipient(destination: &str, amount: u64) -> Result<Recipient> {
    let address = destination.parse::<Address>()?;
    if amount == 0 {
        return Err(Error::InvalidAmount("amount must be greater than zero".to_string()));
    }
    debug!(%address, amount, "Validated transfer recipient");
    Ok(Recipient { address, amount })
}
