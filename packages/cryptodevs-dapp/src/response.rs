//! Response types for the HTTP surface.

use cryptodevs_types::{minted_label, SaleSnapshot, SaleState};
use serde::Serialize;

/// What a renderer needs to draw the page.
#[derive(Serialize)]
pub struct StatusResponse {
    pub state: SaleState,
    pub tokens_minted: String,
    pub max_supply: u32,
    pub minted_label: String,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub is_owner: bool,
    pub presale_started: bool,
    pub presale_ended: bool,
}

impl StatusResponse {
    pub fn new(snapshot: &SaleSnapshot, max_supply: u32, account: Option<String>) -> Self {
        Self {
            state: snapshot.state(),
            tokens_minted: snapshot.tokens_minted.clone(),
            max_supply,
            minted_label: minted_label(&snapshot.tokens_minted, max_supply),
            loading: snapshot.loading,
            account,
            is_owner: snapshot.is_owner,
            presale_started: snapshot.presale_started,
            presale_ended: snapshot.presale_ended,
        }
    }
}

/// Response from the mint / start-presale endpoints.
#[derive(Serialize)]
pub struct TxResponse {
    pub success: bool,
    pub tx_hash: String,
    pub message: &'static str,
}

impl TxResponse {
    pub fn ok(tx_hash: String, message: &'static str) -> Self {
        Self {
            success: true,
            tx_hash,
            message,
        }
    }
}

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub contract: String,
    pub chain_id: u64,
    pub connected: bool,
    pub uptime_secs: u64,
    pub requests: u64,
    pub active_rpc: String,
    pub failovers: u64,
    pub rpc_status: &'static str,
}
