//! HTTP surface over a real RPC client and the fake node.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cryptodevs_dapp::{create_router, AppState};
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::utils::{config_for, spawn_node, FakeNode};

async fn setup(node: Arc<FakeNode>) -> Result<(Router, Arc<AppState>)> {
    let url = spawn_node(node).await?;
    let state = Arc::new(AppState::new(config_for(&url))?);
    Ok((create_router(Arc::clone(&state)), state))
}

async fn send(app: &Router, method: &str, uri: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    let json = serde_json::from_str(&text).unwrap_or(Value::String(text));
    Ok((status, json))
}

#[tokio::test]
async fn test_connect_mint_and_observe_count() -> Result<()> {
    let node = FakeNode::new();
    node.presale_started.store(true, Ordering::Relaxed);
    let (app, state) = setup(node.clone()).await?;

    let (status, body) = send(&app, "GET", "/status").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "disconnected");
    assert_eq!(body["minted_label"], "0/20 have been minted");

    let (status, body) = send(&app, "POST", "/connect").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"], crate::utils::USER.to_string());

    let (status, body) = send(&app, "POST", "/presale-mint").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "You successfully minted a Crypto Dev!");

    // The count poller picks the new supply up within an interval.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let (_, body) = send(&app, "GET", "/status").await?;
        if body["tokens_minted"] == "1" {
            assert_eq!(body["minted_label"], "1/20 have been minted");
            assert_eq!(body["loading"], false);
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "minted count never refreshed"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let (status, body) = send(&app, "GET", "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connected"], true);
    assert_eq!(body["chain_id"], 4);

    let (status, body) = send(&app, "GET", "/metrics").await?;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap_or_default();
    assert!(text.contains("cryptodevs_tokens_minted 1"));

    state.disconnect().await;
    Ok(())
}

#[tokio::test]
async fn test_wrong_chain_connect_is_precondition_failed() -> Result<()> {
    let node = FakeNode::new();
    node.chain_id.store(1, Ordering::Relaxed);
    let (app, state) = setup(node.clone()).await?;

    let (status, body) = send(&app, "POST", "/connect").await?;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "network_mismatch");
    assert_eq!(node.count("eth_call"), 0);
    assert!(state.monitor().await.is_none());

    let (_, body) = send(&app, "GET", "/status").await?;
    assert_eq!(body["state"], "disconnected");
    Ok(())
}

#[tokio::test]
async fn test_rejected_start_presale_is_forbidden() -> Result<()> {
    let node = FakeNode::new();
    *node.owner.lock().unwrap() = crate::utils::USER;
    node.reject_signing.store(true, Ordering::Relaxed);
    let (app, state) = setup(node.clone()).await?;

    let (status, body) = send(&app, "POST", "/start-presale").await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "user_rejected");

    let (_, body) = send(&app, "GET", "/status").await?;
    assert_eq!(body["loading"], false);
    assert_eq!(body["presale_started"], false);

    state.disconnect().await;
    Ok(())
}
