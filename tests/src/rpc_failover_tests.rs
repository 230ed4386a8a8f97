//! Primary → fallback routing of the JSON-RPC client.

use anyhow::Result;
use cryptodevs_dapp::provider::{self, Provider};
use cryptodevs_dapp::RpcClient;
use cryptodevs_types::FailureKind;
use serde_json::json;
use std::time::Duration;

use crate::utils::{spawn_node, FakeNode};

/// Nothing listens here; connects are refused immediately.
const DEAD_PRIMARY: &str = "http://127.0.0.1:1";

#[tokio::test]
async fn test_circuit_opens_and_routes_to_fallback() -> Result<()> {
    let node = FakeNode::new();
    let fallback = spawn_node(node.clone()).await?;
    let rpc = RpcClient::new(DEAD_PRIMARY, Some(&fallback), Duration::from_secs(2))?;

    for _ in 0..5 {
        let err = provider::chain_id(&rpc).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Rpc);
    }
    // Failed calls are not re-sent to the fallback.
    assert_eq!(node.count("eth_chainId"), 0);

    assert!(rpc.is_circuit_open());
    assert_eq!(rpc.active_url(), fallback);
    assert_eq!(rpc.failover_count(), 1);

    assert_eq!(provider::chain_id(&rpc).await?, 4);
    assert_eq!(node.count("eth_chainId"), 1);
    assert_eq!(rpc.health_check().await?, "degraded");
    Ok(())
}

#[tokio::test]
async fn test_no_fallback_keeps_primary() -> Result<()> {
    let rpc = RpcClient::new(DEAD_PRIMARY, None, Duration::from_secs(2))?;
    for _ in 0..6 {
        assert!(provider::chain_id(&rpc).await.is_err());
    }
    assert!(!rpc.is_circuit_open());
    assert_eq!(rpc.active_url(), DEAD_PRIMARY);
    assert_eq!(rpc.failover_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_json_rpc_errors_do_not_trip_circuit() -> Result<()> {
    let primary_node = FakeNode::new();
    let primary = spawn_node(primary_node.clone()).await?;
    let fallback = spawn_node(FakeNode::new()).await?;
    let rpc = RpcClient::new(&primary, Some(&fallback), Duration::from_secs(2))?;

    for _ in 0..10 {
        let err = rpc.request("eth_unknown", json!([])).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Rpc);
    }
    assert!(!rpc.is_circuit_open());
    assert_eq!(rpc.active_url(), primary);
    assert_eq!(primary_node.count("eth_unknown"), 10);
    assert_eq!(rpc.health_check().await?, "ok");
    Ok(())
}
