//! Wallet-route guard and request correlation.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request correlation ID, set by [`inject_request_id`].
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Guards the routes that spend from the connected wallet.
///
/// Open when no `api_key` is configured.
pub async fn require_wallet_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key() else {
        return next.run(request).await;
    };

    if presented_key(request.headers()).is_some_and(|key| keys_match(key, expected)) {
        return next.run(request).await;
    }

    let req_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.as_str())
        .unwrap_or("-");
    warn!(req_id, path = %request.uri().path(), "Wallet route refused: bad or missing API key");

    let body = serde_json::json!({
        "success": false,
        "kind": "unauthorized",
        "error": "a valid API key is required to send wallet transactions",
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// `X-Api-Key`, else `Authorization: Bearer`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(key);
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.len() == expected.len() && provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Keep the caller's `x-request-id` or mint a `cd-` one; echoed on the response.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let id = match request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(id) => id.to_string(),
        None => format!("cd-{:016x}", rand::random::<u64>()),
    };
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
