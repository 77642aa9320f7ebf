//! Construction-time configuration

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Network a kit talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    #[default]
    Devnet,
    Local,
}

impl NetworkType {
    /// Default full node JSON-RPC endpoint
    pub fn default_fullnode_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Self::Testnet => "https://fullnode.testnet.sui.io:443",
            Self::Devnet => "https://fullnode.devnet.sui.io:443",
            Self::Local => "http://127.0.0.1:9000",
        }
    }

    /// Default faucet endpoint; mainnet has none
    pub fn default_faucet_url(&self) -> Option<&'static str> {
        match self {
            Self::Mainnet => None,
            Self::Testnet => Some("https://faucet.testnet.sui.io/v1/gas"),
            Self::Devnet => Some("https://faucet.devnet.sui.io/v1/gas"),
            Self::Local => Some("http://127.0.0.1:9123/gas"),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "local" | "localnet" => Ok(Self::Local),
            other => Err(Error::Config(format!("unknown network type: {}", other))),
        }
    }
}

/// Everything needed to construct a kit.
///
/// Secrets are skipped when serializing.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KitConfig {
    /// Space separated mnemonic words
    #[serde(skip_serializing)]
    pub mnemonics: Option<String>,
    /// Hex or base64 secret key; ignored when `mnemonics` is set
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub network_type: NetworkType,
    pub fullnode_url: Option<String>,
    pub faucet_url: Option<String>,
    /// Build toolchain binary. The kit never runs it; it is here for the
    /// [`PackagePublisher`](crate::transaction::PackagePublisher) the caller
    /// plugs in through `TransactionOrchestrator::with_publisher`.
    pub toolchain_bin: Option<PathBuf>,
}

impl KitConfig {
    /// Load configuration from `HDKIT_*` environment variables
    pub fn from_env() -> Result<Self> {
        let network_type = match non_empty_env("HDKIT_NETWORK") {
            Some(value) => value.parse()?,
            None => NetworkType::default(),
        };

        Ok(Self {
            mnemonics: non_empty_env("HDKIT_MNEMONICS"),
            secret_key: non_empty_env("HDKIT_SECRET_KEY"),
            network_type,
            fullnode_url: non_empty_env("HDKIT_FULLNODE_URL"),
            faucet_url: non_empty_env("HDKIT_FAUCET_URL"),
            toolchain_bin: non_empty_env("HDKIT_TOOLCHAIN_BIN").map(PathBuf::from),
        })
    }

    pub fn with_mnemonics(mut self, mnemonics: impl Into<String>) -> Self {
        self.mnemonics = Some(mnemonics.into());
        self
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_toolchain_bin(mut self, toolchain_bin: impl Into<PathBuf>) -> Self {
        self.toolchain_bin = Some(toolchain_bin.into());
        self
    }

    pub fn with_network(mut self, network_type: NetworkType) -> Self {
        self.network_type = network_type;
        self
    }

    /// Full node URL: the override if set, else the network default
    pub fn resolved_fullnode_url(&self) -> String {
        self.fullnode_url
            .clone()
            .unwrap_or_else(|| self.network_type.default_fullnode_url().to_string())
    }

    /// Faucet URL: the override if set, else the network default
    pub fn resolved_faucet_url(&self) -> Option<String> {
        self.faucet_url
            .clone()
            .or_else(|| self.network_type.default_faucet_url().map(str::to_string))
    }
}

impl fmt::Debug for KitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KitConfig")
            .field("mnemonics", &self.mnemonics.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("network_type", &self.network_type)
            .field("fullnode_url", &self.fullnode_url)
            .field("faucet_url", &self.faucet_url)
            .field("toolchain_bin", &self.toolchain_bin)
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
