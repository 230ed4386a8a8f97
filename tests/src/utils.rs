//! In-process fake wallet node speaking JSON-RPC 2.0 over HTTP.
//!
//! Mirrors the sale contract closely enough to drive a full session:
//! `startPresale()` opens a presale window, both mints bump `tokenIds()`.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use anyhow::Result;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use cryptodevs_dapp::contract::CryptoDevsContract;
use cryptodevs_dapp::{Config, NetworkGuard, RpcClient, SaleMonitor, Session};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CONTRACT: Address = Address::repeat_byte(0xC0);
pub const USER: Address = Address::repeat_byte(0x11);
pub const DEPLOYER: Address = Address::repeat_byte(0x22);

/// 0.01 ether.
pub const MINT_PRICE_WEI: u64 = 10_000_000_000_000_000;

const USER_REJECTED: i64 = 4001;
const EXECUTION_ERROR: i64 = -32000;
const METHOD_NOT_FOUND: i64 = -32601;

pub struct FakeNode {
    pub chain_id: AtomicU64,
    pub accounts: Mutex<Vec<Address>>,
    pub owner: Mutex<Address>,
    pub presale_started: AtomicBool,
    pub presale_end: AtomicU64,
    /// `presaleEnded()` after a confirmed `startPresale()`.
    pub end_after_start: AtomicU64,
    pub token_ids: AtomicU64,
    pub reject_signing: AtomicBool,
    /// Revert reason returned by `eth_sendTransaction`.
    pub revert: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<Value>>,
}

impl FakeNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            chain_id: AtomicU64::new(4),
            accounts: Mutex::new(vec![USER]),
            owner: Mutex::new(DEPLOYER),
            presale_started: AtomicBool::new(false),
            presale_end: AtomicU64::new(0),
            end_after_start: AtomicU64::new(u64::MAX),
            token_ids: AtomicU64::new(0),
            reject_signing: AtomicBool::new(false),
            revert: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.as_str() == method)
            .count()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, (i64, String)> {
        match method {
            "eth_chainId" => Ok(json!(format!(
                "0x{:x}",
                self.chain_id.load(Ordering::Relaxed)
            ))),
            "eth_requestAccounts" | "eth_accounts" => Ok(json!(*self.accounts.lock().unwrap())),
            "eth_blockNumber" => Ok(json!("0x2a")),
            "eth_call" => {
                let data = calldata(params)?;
                Ok(json!(Bytes::from(self.view(&data)?)))
            }
            "eth_sendTransaction" => {
                if self.reject_signing.load(Ordering::Relaxed) {
                    return Err((USER_REJECTED, "User denied transaction signature.".into()));
                }
                if let Some(reason) = self.revert.lock().unwrap().clone() {
                    return Err((EXECUTION_ERROR, format!("execution reverted: {reason}")));
                }
                let data = calldata(params)?;
                self.execute(&data)?;
                let mut sent = self.sent.lock().unwrap();
                sent.push(params[0].clone());
                Ok(json!(B256::left_padding_from(&(sent.len() as u64).to_be_bytes())))
            }
            "eth_getTransactionReceipt" => Ok(json!({
                "transactionHash": params[0],
                "blockNumber": "0x2b",
                "status": "0x1",
            })),
            other => Err((METHOD_NOT_FOUND, format!("the method {other} does not exist"))),
        }
    }

    fn view(&self, data: &[u8]) -> Result<Vec<u8>, (i64, String)> {
        let selector = &data[..4];
        if selector == selector_of("presaleStarted()") {
            Ok(self.presale_started.load(Ordering::Relaxed).abi_encode())
        } else if selector == selector_of("presaleEnded()") {
            Ok(U256::from(self.presale_end.load(Ordering::Relaxed)).abi_encode())
        } else if selector == selector_of("owner()") {
            Ok(self.owner.lock().unwrap().abi_encode())
        } else if selector == selector_of("tokenIds()") {
            Ok(U256::from(self.token_ids.load(Ordering::Relaxed)).abi_encode())
        } else {
            Err((EXECUTION_ERROR, "execution reverted".into()))
        }
    }

    fn execute(&self, data: &[u8]) -> Result<(), (i64, String)> {
        let selector = &data[..4];
        if selector == selector_of("startPresale()") {
            self.presale_started.store(true, Ordering::Relaxed);
            self.presale_end
                .store(self.end_after_start.load(Ordering::Relaxed), Ordering::Relaxed);
            Ok(())
        } else if selector == selector_of("presaleMint()") || selector == selector_of("mint()") {
            self.token_ids.fetch_add(1, Ordering::Relaxed);
            Ok(())
        } else {
            Err((EXECUTION_ERROR, "execution reverted".into()))
        }
    }
}

fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn calldata(params: &Value) -> Result<Bytes, (i64, String)> {
    let data: Bytes = serde_json::from_value(params[0]["data"].clone())
        .map_err(|e| (-32602, format!("invalid data: {e}")))?;
    if data.len() < 4 {
        return Err((-32602, "calldata too short".into()));
    }
    Ok(data)
}

async fn handle(State(node): State<Arc<FakeNode>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    node.calls.lock().unwrap().push(method.clone());
    let body = match node.answer(&method, &request["params"]) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message },
        }),
    };
    Json(body)
}

/// Serve `node` on an ephemeral port. Returns its URL.
pub async fn spawn_node(node: Arc<FakeNode>) -> Result<String> {
    let app = Router::new().route("/", post(handle)).with_state(node);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

pub fn config_for(url: &str) -> Config {
    Config {
        rpc_url: url.to_string(),
        contract_address: CONTRACT.to_string(),
        poll_interval_secs: 1,
        receipt_poll_interval_ms: 50,
        rpc_timeout_secs: 5,
        ..Config::default()
    }
}

pub fn rpc_client(url: &str) -> Result<Arc<RpcClient>> {
    Ok(Arc::new(RpcClient::new(url, None, Duration::from_secs(5))?))
}

/// Connected session plus a monitor whose clock reads `now`.
pub async fn connect_monitor(url: &str, now: Arc<AtomicU64>) -> Result<SaleMonitor> {
    let rpc = rpc_client(url)?;
    let session = Session::connect(rpc, NetworkGuard::new(4, "rinkeby")).await?;
    let contract = CryptoDevsContract::new(Arc::new(session), CONTRACT, Duration::from_millis(50));
    Ok(SaleMonitor::new(contract, U256::from(MINT_PRICE_WEI))
        .with_clock(Arc::new(move || now.load(Ordering::Relaxed))))
}
