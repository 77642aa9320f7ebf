//! JSON-RPC network provider

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::provider::NetworkProvider;
use super::types::{Balance, ExecutionResult, ExecutionStatus, SignedTransaction};
use crate::config::KitConfig;
use crate::crypto::address::Address;
use crate::error::{Error, Result};

/// Native coin type used when a balance query names none
pub const NATIVE_COIN_TYPE: &str = "0x2::sui::SUI";

/// Provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Full node JSON-RPC URL
    pub url: String,
    /// Faucet URL, if the network has one
    pub faucet_url: Option<String>,
    /// Timeout in seconds
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    pub fn from_kit_config(config: &KitConfig) -> Self {
        Self {
            url: config.resolved_fullnode_url(),
            faucet_url: config.resolved_faucet_url(),
            timeout: Some(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBalance {
    coin_type: String,
    coin_object_count: u64,
    total_balance: String,
}

#[derive(Debug, Deserialize)]
struct RpcExecution {
    digest: String,
    effects: Option<RpcEffects>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcEffects {
    status: RpcStatus,
    gas_used: Option<RpcGasUsed>,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    status: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcGasUsed {
    computation_cost: String,
    storage_cost: String,
    storage_rebate: String,
}

#[derive(Debug, Deserialize)]
struct FaucetResponse {
    error: Option<String>,
}

/// Network provider speaking the full node JSON-RPC and the faucet HTTP API.
///
/// Each call makes exactly one request. Balance and faucet requests work
/// against any full node. `execute_transaction` forwards the kit's own
/// [`TransactionData`](super::types::TransactionData) encoding as-is, so a
/// node only accepts it behind a gateway that understands that envelope; it
/// does not produce on-chain BCS bytes.
#[derive(Debug)]
pub struct JsonRpcProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_kit_config(config: &KitConfig) -> Result<Self> {
        Self::new(ProviderConfig::from_kit_config(config))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<RpcResponse<T>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.config.url)
            .json(&request_body(id, method, params))
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} request failed: {}", method, e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        response
            .json::<RpcResponse<T>>()
            .await
            .map_err(|e| Error::Network(format!("{} response malformed: {}", method, e)))
    }
}

fn request_body(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

fn into_result<T>(method: &str, response: RpcResponse<T>, on_error: fn(String) -> Error) -> Result<T> {
    if let Some(error) = response.error {
        return Err(on_error(format!("{} failed ({}): {}", method, error.code, error.message)));
    }
    response
        .result
        .ok_or_else(|| Error::Network(format!("{} returned no result", method)))
}

fn convert_balance(balance: RpcBalance) -> Result<Balance> {
    let total_balance = balance
        .total_balance
        .parse::<u128>()
        .map_err(|e| Error::Network(format!("Invalid balance {}: {}", balance.total_balance, e)))?;

    Ok(Balance {
        coin_type: balance.coin_type,
        coin_object_count: balance.coin_object_count,
        total_balance,
    })
}

fn convert_execution(execution: RpcExecution) -> Result<ExecutionResult> {
    let effects = execution
        .effects
        .ok_or_else(|| Error::Execution(format!("no effects returned for {}", execution.digest)))?;

    let status = match effects.status.status.as_str() {
        "success" => ExecutionStatus::Success,
        _ => ExecutionStatus::Failure {
            error: effects
                .status
                .error
                .unwrap_or_else(|| "unknown execution failure".to_string()),
        },
    };

    let gas_used = effects.gas_used.map(|gas| total_gas(&gas)).transpose()?;

    Ok(ExecutionResult {
        digest: execution.digest,
        status,
        gas_used,
    })
}

/// Net gas charged: computation plus storage, minus the storage rebate
fn total_gas(gas: &RpcGasUsed) -> Result<u64> {
    let parse = |field: &str, value: &str| {
        value
            .parse::<u64>()
            .map_err(|e| Error::Network(format!("Invalid gas {} {}: {}", field, value, e)))
    };

    let computation = parse("computationCost", &gas.computation_cost)?;
    let storage = parse("storageCost", &gas.storage_cost)?;
    let rebate = parse("storageRebate", &gas.storage_rebate)?;

    computation
        .checked_add(storage)
        .map(|charged| charged.saturating_sub(rebate))
        .ok_or_else(|| Error::Network(format!("gas cost overflow: {} + {}", computation, storage)))
}

fn execute_params(signed: &SignedTransaction) -> Value {
    json!([
        signed.tx_bytes_base64(),
        [signed.signature_base64()],
        { "showEffects": true },
        "WaitForLocalExecution",
    ])
}

#[async_trait]
impl NetworkProvider for JsonRpcProvider {
    async fn get_balance(&self, address: &Address, coin_type: Option<&str>) -> Result<Balance> {
        let coin_type = coin_type.unwrap_or(NATIVE_COIN_TYPE);
        let response = self
            .call::<RpcBalance>("suix_getBalance", json!([address.to_string(), coin_type]))
            .await?;
        convert_balance(into_result("suix_getBalance", response, Error::Network)?)
    }

    async fn request_faucet(&self, address: &Address) -> Result<bool> {
        let url = self
            .config
            .faucet_url
            .as_deref()
            .ok_or_else(|| Error::Config("no faucet configured for this network".to_string()))?;

        let response = self
            .client
            .post(url)
            .json(&json!({ "FixedAmountRequest": { "recipient": address.to_string() } }))
            .send()
            .await
            .map_err(|e| Error::Network(format!("faucet request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(%address, "Faucet rate limited the request");
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Error::Network(format!("faucet returned HTTP {}", response.status())));
        }

        let body = response
            .json::<FaucetResponse>()
            .await
            .map_err(|e| Error::Network(format!("faucet response malformed: {}", e)))?;
        Ok(body.error.is_none())
    }

    async fn execute_transaction(&self, signed: &SignedTransaction) -> Result<ExecutionResult> {
        let response = self
            .call::<RpcExecution>("sui_executeTransactionBlock", execute_params(signed))
            .await?;
        convert_execution(into_result("sui_executeTransactionBlock", response, Error::Execution)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkType;

    #[test]
    fn test_provider_config_from_kit_config() {
        let config = ProviderConfig::from_kit_config(&KitConfig::default().with_network(NetworkType::Local));
        assert_eq!(config.url, "http://127.0.0.1:9000");
        assert_eq!(config.faucet_url.as_deref(), Some("http://127.0.0.1:9123/gas"));
    }

    #[test]
    fn test_request_body() {
        let body = request_body(7, "suix_getBalance", json!(["0x1", NATIVE_COIN_TYPE]));
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 7);
        assert_eq!(body["method"], "suix_getBalance");
        assert_eq!(body["params"][1], NATIVE_COIN_TYPE);
    }

    #[test]
    fn test_balance_response() {
        let response: RpcResponse<RpcBalance> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "coinType": NATIVE_COIN_TYPE,
                "coinObjectCount": 3,
                "totalBalance": "340282366920938463463374607431768211455",
                "lockedBalance": {}
            }
        }))
        .unwrap();

        let balance = convert_balance(into_result("suix_getBalance", response, Error::Network).unwrap()).unwrap();
        assert_eq!(balance.coin_object_count, 3);
        assert_eq!(balance.total_balance, u128::MAX);
    }

    #[test]
    fn test_rpc_error_maps_through_callback() {
        let response: RpcResponse<RpcExecution> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32002, "message": "Transaction has non recoverable errors" }
        }))
        .unwrap();

        let err = into_result("sui_executeTransactionBlock", response, Error::Execution).unwrap_err();
        assert!(matches!(err, Error::Execution(ref m) if m.contains("-32002")));
    }

    #[test]
    fn test_execution_response() {
        let execution: RpcExecution = serde_json::from_value(json!({
            "digest": "9Xz",
            "effects": {
                "status": { "status": "failure", "error": "InsufficientGas" },
                "gasUsed": {
                    "computationCost": "1000",
                    "storageCost": "500",
                    "storageRebate": "200"
                }
            }
        }))
        .unwrap();

        let result = convert_execution(execution).unwrap();
        assert_eq!(result.digest, "9Xz");
        assert_eq!(result.gas_used, Some(1300));
        assert_eq!(
            result.status,
            ExecutionStatus::Failure {
                error: "InsufficientGas".to_string()
            }
        );
    }

    fn execution_with_gas(computation: &str, storage: &str, rebate: &str) -> RpcExecution {
        serde_json::from_value(json!({
            "digest": "gas",
            "effects": {
                "status": { "status": "success" },
                "gasUsed": {
                    "computationCost": computation,
                    "storageCost": storage,
                    "storageRebate": rebate
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_gas_overflow_is_network_error() {
        let execution = execution_with_gas("18446744073709551615", "1", "0");
        assert!(matches!(convert_execution(execution), Err(Error::Network(ref m)) if m.contains("overflow")));
    }

    #[test]
    fn test_malformed_gas_is_network_error() {
        let execution = execution_with_gas("1000", "lots", "0");
        assert!(matches!(convert_execution(execution), Err(Error::Network(ref m)) if m.contains("storageCost")));
    }

    #[test]
    fn test_rebate_larger_than_charge() {
        let result = convert_execution(execution_with_gas("10", "5", "100")).unwrap();
        assert_eq!(result.gas_used, Some(0));
    }

    #[test]
    fn test_execute_params_carry_signed_bytes() {
        use crate::transaction::types::TransactionData;

        let sender = crate::crypto::keys::KeyPair::from_secret_bytes(&[7u8; 32]).address();
        let tx_bytes = TransactionData::programmable(vec![1, 2, 3]).with_sender(sender).to_bytes().unwrap();
        let signed = SignedTransaction::new(tx_bytes, vec![0u8; 97]);

        let params = execute_params(&signed);
        assert_eq!(params[0], signed.tx_bytes_base64());
        assert_eq!(params[1][0], signed.signature_base64());
        assert_eq!(params[2]["showEffects"], true);
        assert_eq!(params[3], "WaitForLocalExecution");
    }

    #[test]
    fn test_missing_faucet_url_is_config_error() {
        let provider = JsonRpcProvider::new(ProviderConfig {
            url: "http://127.0.0.1:9000".to_string(),
            faucet_url: None,
            timeout: None,
        })
        .unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let address = crate::crypto::keys::KeyPair::from_secret_bytes(&[1u8; 32]).address();
        let result = runtime.block_on(provider.request_faucet(&address));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
