//! JSON-RPC client with primary → fallback routing and circuit breaker.
//!
//! A failed request is never re-sent; repeated transport failures open the
//! circuit and route the *next* requests to the fallback endpoint.

use crate::metrics::METRICS;
use crate::provider::{BoxFuture, Provider, USER_REJECTED_CODE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Consecutive transport failures before the circuit breaker opens.
const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
/// How long (ms) before a tripped breaker retries the primary.
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;
/// Connection establishment limit; overall request timeout is configured.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl JsonRpcError {
    fn into_error(self, method: &str) -> crate::Error {
        if self.code == USER_REJECTED_CODE {
            return crate::Error::UserRejected(self.message);
        }
        if self.message.contains("execution reverted") {
            let reason = match self.data {
                Some(Value::String(data)) => format!("{} ({data})", self.message),
                _ => self.message,
            };
            return crate::Error::Reverted {
                tx_hash: None,
                reason,
            };
        }
        crate::Error::Rpc(format!("{method} failed: code={} {}", self.code, self.message))
    }
}

/// JSON-RPC over HTTP with primary → fallback routing.
pub struct RpcClient {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: Option<String>,
    next_id: AtomicU64,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
}

impl RpcClient {
    pub fn new(
        primary_url: &str,
        fallback_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::Config(format!("HTTP client build failed: {e}")))?;
        info!(
            primary = primary_url,
            fallback = fallback_url.unwrap_or("none"),
            "RPC client initialized"
        );
        Ok(Self {
            http,
            primary_url: primary_url.to_string(),
            fallback_url: fallback_url.map(str::to_string),
            next_id: AtomicU64::new(1),
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            total_failovers: AtomicU64::new(0),
        })
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    /// Quick connectivity check. Returns "ok", "degraded" (on fallback), or error.
    pub async fn health_check(&self) -> Result<&'static str, crate::Error> {
        self.send("eth_blockNumber", Value::Array(Vec::new())).await?;
        if self.is_circuit_open() {
            Ok("degraded")
        } else {
            Ok("ok")
        }
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value, crate::Error> {
        let url = self.active_url().to_string();
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, url = %url, id = body.id, "JSON-RPC request");

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                self.record_failure(&url);
                return Err(crate::Error::Rpc(format!("{method} transport error: {e}")));
            }
        };

        let status = response.status();
        let parsed: JsonRpcResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                self.record_failure(&url);
                return Err(crate::Error::Rpc(format!(
                    "{method} bad response (HTTP {status}): {e}"
                )));
            }
        };
        // The endpoint answered; JSON-RPC errors are not transport failures.
        self.record_success(&url);

        if let Some(err) = parsed.error {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            return Err(err.into_error(method));
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }

    // --- Failover / circuit breaker ---

    fn record_success(&self, url: &str) {
        if url != self.primary_url {
            return;
        }
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 {
            info!(primary = %self.primary_url, "Primary RPC recovered");
            circuit.failures = 0;
            circuit.open = false;
        }
    }

    fn record_failure(&self, url: &str) {
        METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
        if url != self.primary_url {
            warn!(fallback = %url, "Fallback RPC request failed");
            return;
        }
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if circuit.failures >= CIRCUIT_BREAKER_THRESHOLD && !circuit.open {
            let Some(fallback) = &self.fallback_url else {
                warn!(failures = circuit.failures, "Primary RPC failing, no fallback configured");
                return;
            };
            circuit.open = true;
            self.total_failovers.fetch_add(1, Ordering::Relaxed);
            METRICS.rpc_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = %fallback,
                "Circuit breaker opened, routing to fallback"
            );
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        // Half-open: retry primary after window
        if now_ms().saturating_sub(circuit.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }

    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }

    /// Currently active RPC URL.
    pub fn active_url(&self) -> &str {
        match &self.fallback_url {
            Some(fallback) if self.is_circuit_open() => fallback,
            _ => &self.primary_url,
        }
    }
}

impl Provider for RpcClient {
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value, crate::Error>> {
        Box::pin(self.send(method, params))
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
