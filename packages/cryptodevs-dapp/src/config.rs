//! Client configuration.

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::time::Duration;

/// Wei per gwei.
const GWEI: u64 = 1_000_000_000;

/// Configuration for the mint client.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Wallet provider JSON-RPC endpoint (signs `eth_sendTransaction`).
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    /// Read-only fallback used while the primary circuit is open.
    #[serde(default)]
    pub fallback_rpc_url: Option<String>,

    #[serde(default = "defaults::chain_id")]
    pub chain_id: u64,

    /// Shown in the "change the network" notice.
    #[serde(default = "defaults::network_name")]
    pub network_name: String,

    #[serde(default = "defaults::contract_address")]
    pub contract_address: String,

    #[serde(default = "defaults::poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "defaults::receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    #[serde(default = "defaults::rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,

    /// Value attached to `presaleMint()` / `mint()`.
    #[serde(default = "defaults::mint_price_gwei")]
    pub mint_price_gwei: u64,

    #[serde(default = "defaults::max_supply")]
    pub max_supply: u32,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Required on the wallet-spending routes when set (`CRYPTODEVS_API_KEY`).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: None,
            chain_id: defaults::chain_id(),
            network_name: defaults::network_name(),
            contract_address: defaults::contract_address(),
            poll_interval_secs: defaults::poll_interval_secs(),
            receipt_poll_interval_ms: defaults::receipt_poll_interval_ms(),
            rpc_timeout_secs: defaults::rpc_timeout_secs(),
            mint_price_gwei: defaults::mint_price_gwei(),
            max_supply: defaults::max_supply(),
            bind_address: defaults::bind_address(),
            api_key: None,
        }
    }
}

impl Config {
    /// Parsed contract address. The zero address means "not configured".
    pub fn contract(&self) -> Result<Address, crate::Error> {
        let address: Address = self.contract_address.parse().map_err(|e| {
            crate::Error::Config(format!(
                "invalid contract_address {:?}: {e}",
                self.contract_address
            ))
        })?;
        if address.is_zero() {
            return Err(crate::Error::Config(
                "contract_address is not set (CRYPTODEVS_CONTRACT_ADDRESS)".into(),
            ));
        }
        Ok(address)
    }

    /// Configured API key; an empty value counts as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn mint_price_wei(&self) -> U256 {
        U256::from(self.mint_price_gwei) * U256::from(GWEI)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms.max(100))
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

mod defaults {
    pub fn rpc_url() -> String {
        // Priority: CRYPTODEVS_RPC_URL (via config env source) > WALLET_RPC_URL > local node
        if let Ok(url) = std::env::var("WALLET_RPC_URL") {
            if !url.is_empty() {
                return url;
            }
        }
        "http://127.0.0.1:8545".into()
    }

    pub fn chain_id() -> u64 {
        4
    }

    pub fn network_name() -> String {
        "rinkeby".into()
    }

    pub fn contract_address() -> String {
        "0x0000000000000000000000000000000000000000".into()
    }

    pub fn poll_interval_secs() -> u64 {
        5
    }

    pub fn receipt_poll_interval_ms() -> u64 {
        2_000
    }

    pub fn rpc_timeout_secs() -> u64 {
        30
    }

    /// 0.01 ether.
    pub fn mint_price_gwei() -> u64 {
        10_000_000
    }

    pub fn max_supply() -> u32 {
        20
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }
}
