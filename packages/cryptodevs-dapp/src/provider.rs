//! EIP-1193 style provider seam and the typed `eth_*` calls built on it.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// JSON-RPC error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// A JSON-RPC endpoint backed by a wallet (or node) that can sign.
pub trait Provider: Send + Sync {
    /// Raw JSON-RPC request. `params` must be a JSON array.
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value, crate::Error>>;
}

/// Outgoing transaction; the wallet fills in gas, nonce and signature.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` revert.
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        match self.status.as_deref().map(parse_quantity) {
            Some(Ok(status)) => status == 1,
            // Pre-Byzantium receipts carry no status.
            None => true,
            Some(Err(_)) => false,
        }
    }
}

pub async fn chain_id(provider: &dyn Provider) -> Result<u64, crate::Error> {
    let value = provider.request("eth_chainId", json!([])).await?;
    let s = value
        .as_str()
        .ok_or_else(|| crate::Error::Rpc(format!("eth_chainId returned {value}")))?;
    parse_quantity(s)
}

/// Prompts the wallet for account access.
pub async fn request_accounts(provider: &dyn Provider) -> Result<Vec<Address>, crate::Error> {
    let value = provider.request("eth_requestAccounts", json!([])).await?;
    decode(value, "eth_requestAccounts")
}

/// Read-only contract call against the latest block.
pub async fn call(provider: &dyn Provider, to: Address, data: Bytes) -> Result<Bytes, crate::Error> {
    let value = provider
        .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
        .await?;
    decode(value, "eth_call")
}

/// Hands the transaction to the wallet for signing and broadcast.
pub async fn send_transaction(
    provider: &dyn Provider,
    tx: &TransactionRequest,
) -> Result<B256, crate::Error> {
    let value = provider
        .request("eth_sendTransaction", json!([tx]))
        .await?;
    decode(value, "eth_sendTransaction")
}

/// `None` until the transaction is mined.
pub async fn transaction_receipt(
    provider: &dyn Provider,
    hash: B256,
) -> Result<Option<TransactionReceipt>, crate::Error> {
    let value = provider
        .request("eth_getTransactionReceipt", json!([hash]))
        .await?;
    decode(value, "eth_getTransactionReceipt")
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(s: &str) -> Result<u64, crate::Error> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| crate::Error::Rpc(format!("not a hex quantity: {s:?}")))?;
    if digits.is_empty() {
        return Err(crate::Error::Rpc(format!("not a hex quantity: {s:?}")));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| crate::Error::Rpc(format!("bad hex quantity {s:?}: {e}")))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, method: &str) -> Result<T, crate::Error> {
    serde_json::from_value(value)
        .map_err(|e| crate::Error::Rpc(format!("unexpected {method} result: {e}")))
}

// --- Test helpers (shared across module tests) ---
