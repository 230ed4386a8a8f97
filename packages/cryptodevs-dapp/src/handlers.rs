//! HTTP request handlers.

use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::{HealthResponse, StatusResponse, TxResponse};
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::response::IntoResponse;
use axum::Json;
use cryptodevs_types::SaleSnapshot;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

const MINTED_MESSAGE: &str = "You successfully minted a Crypto Dev!";
const PRESALE_STARTED_MESSAGE: &str = "Presale started";

/// Current sale state for the renderer.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (snapshot, account) = match state.monitor().await {
        Some(monitor) => (
            monitor.snapshot(),
            Some(monitor.contract().session().address().to_string()),
        ),
        None => (SaleSnapshot::default(), None),
    };
    Json(StatusResponse::new(&snapshot, state.config.max_supply, account))
}

/// Connect the wallet (prompts in the wallet) and start polling.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<StatusResponse>, crate::Error> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let monitor = state.connect().await.inspect_err(|e| {
        warn!(req_id = %req_id.0, error = %e, kind = %e.kind(), "Wallet connect failed");
    })?;
    let account = monitor.contract().session().address().to_string();
    info!(req_id = %req_id.0, account = %account, "Wallet connected");
    Ok(Json(StatusResponse::new(
        &monitor.snapshot(),
        state.config.max_supply,
        Some(account),
    )))
}

/// `POST /presale-mint`
pub async fn presale_mint(
    State(state): State<Arc<AppState>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<TxResponse>, crate::Error> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    info!(req_id = %req_id.0, "Presale mint requested");
    let monitor = state.connect().await?;
    let receipt = monitor.presale_mint().await?;
    Ok(Json(TxResponse::ok(
        receipt.transaction_hash.to_string(),
        MINTED_MESSAGE,
    )))
}

/// `POST /mint`
pub async fn mint(
    State(state): State<Arc<AppState>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<TxResponse>, crate::Error> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    info!(req_id = %req_id.0, "Public mint requested");
    let monitor = state.connect().await?;
    let receipt = monitor.mint().await?;
    Ok(Json(TxResponse::ok(
        receipt.transaction_hash.to_string(),
        MINTED_MESSAGE,
    )))
}

/// `POST /start-presale`
pub async fn start_presale(
    State(state): State<Arc<AppState>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<TxResponse>, crate::Error> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    info!(req_id = %req_id.0, "Start presale requested");
    let monitor = state.connect().await?;
    let receipt = monitor.start_presale().await?;
    Ok(Json(TxResponse::ok(
        receipt.transaction_hash.to_string(),
        PRESALE_STARTED_MESSAGE,
    )))
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot().await;
    let body = METRICS.render(&snapshot.tokens_minted, snapshot.loading);
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    )
}

/// Health check with RPC status.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let rpc_status = state.rpc.health_check().await.unwrap_or("unavailable");
    let connected = state.monitor().await.is_some();

    let status = match rpc_status {
        "unavailable" => "unavailable",
        "degraded" => "degraded",
        _ if !connected => "degraded",
        _ => "ok",
    };

    Json(HealthResponse {
        status,
        contract: state.contract_address.to_string(),
        chain_id: state.config.chain_id,
        connected,
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        active_rpc: state.rpc.active_url().to_string(),
        failovers: state.rpc.failover_count(),
        rpc_status,
    })
}
