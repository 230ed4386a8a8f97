//! Error types for the mint client.

use alloy_primitives::B256;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cryptodevs_types::FailureKind;
use std::fmt;

/// Client error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Wallet connect or signature request declined.
    UserRejected(String),
    /// Provider is on the wrong chain.
    WrongNetwork {
        expected: u64,
        actual: u64,
        network: String,
    },
    /// RPC communication error (transport, JSON-RPC error object, ABI decode).
    Rpc(String),
    /// Contract rejected the call.
    Reverted {
        tx_hash: Option<B256>,
        reason: String,
    },
    /// Another state-changing call is awaiting confirmation.
    Busy,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Config(_) => FailureKind::Config,
            Error::UserRejected(_) => FailureKind::UserRejected,
            Error::WrongNetwork { .. } => FailureKind::NetworkMismatch,
            Error::Rpc(_) => FailureKind::Rpc,
            Error::Reverted { .. } => FailureKind::Reverted,
            Error::Busy => FailureKind::Busy,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::UserRejected(msg) => write!(f, "rejected by user: {msg}"),
            Error::WrongNetwork {
                expected,
                actual,
                network,
            } => write!(
                f,
                "change the network to {network} (chain id {expected}, wallet is on {actual})"
            ),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Reverted {
                tx_hash: Some(hash),
                reason,
            } => write!(f, "transaction {hash} reverted: {reason}"),
            Error::Reverted {
                tx_hash: None,
                reason,
            } => write!(f, "execution reverted: {reason}"),
            Error::Busy => write!(f, "a transaction is already awaiting confirmation"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UserRejected(_) => StatusCode::FORBIDDEN,
            Error::WrongNetwork { .. } => StatusCode::PRECONDITION_FAILED,
            Error::Rpc(_) => StatusCode::BAD_GATEWAY,
            Error::Reverted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Busy => StatusCode::CONFLICT,
        };
        let body = serde_json::json!({
            "success": false,
            "kind": self.kind(),
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}
