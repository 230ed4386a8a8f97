//! Application state shared across handlers.

use crate::config::Config;
use crate::contract::CryptoDevsContract;
use crate::monitor::{PollerHandle, SaleMonitor};
use crate::provider::Provider;
use crate::rpc::RpcClient;
use crate::wallet::{NetworkGuard, Session};
use alloy_primitives::Address;
use cryptodevs_types::SaleSnapshot;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A live wallet session with its monitor and poll loops.
pub struct Connection {
    pub monitor: Arc<SaleMonitor>,
    poller: PollerHandle,
}

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub rpc: Arc<RpcClient>,
    pub contract_address: Address,
    pub start_time: Instant,
    pub request_count: AtomicU64,
    provider: Arc<dyn Provider>,
    connection: RwLock<Option<Connection>>,
    /// Serializes wallet prompts; `connection` is only written to install.
    connecting: Mutex<()>,
    cancel: CancellationToken,
}

impl AppState {
    /// Create application state from configuration. No wallet is connected yet.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let contract_address = config.contract()?;
        let rpc = Arc::new(RpcClient::new(
            &config.rpc_url,
            config.fallback_rpc_url.as_deref(),
            config.rpc_timeout(),
        )?);
        let provider: Arc<dyn Provider> = rpc.clone();
        Ok(Self::with_provider(config, contract_address, rpc, provider))
    }

    /// State over an explicit provider. `rpc` still backs the health check.
    pub fn with_provider(
        config: Config,
        contract_address: Address,
        rpc: Arc<RpcClient>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            config,
            rpc,
            contract_address,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            provider,
            connection: RwLock::new(None),
            connecting: Mutex::new(()),
            cancel: CancellationToken::new(),
        }
    }

    /// Connect the wallet and start polling. A second call while connected is a no-op.
    ///
    /// Readers of the snapshot are never blocked by the wallet prompt.
    pub async fn connect(&self) -> Result<Arc<SaleMonitor>, crate::Error> {
        if let Some(monitor) = self.monitor().await {
            return Ok(monitor);
        }
        let _connecting = self.connecting.lock().await;
        // Another caller may have connected while we waited.
        if let Some(monitor) = self.monitor().await {
            return Ok(monitor);
        }

        let guard = NetworkGuard::new(self.config.chain_id, self.config.network_name.clone());
        let session = Arc::new(Session::connect(Arc::clone(&self.provider), guard).await?);
        let contract = CryptoDevsContract::new(
            session,
            self.contract_address,
            self.config.receipt_poll_interval(),
        );
        let monitor = Arc::new(SaleMonitor::new(contract, self.config.mint_price_wei()));
        let poller = monitor.spawn_pollers(self.config.poll_interval(), self.cancel.child_token());

        info!(contract = %self.contract_address, "Sale monitor running");
        *self.connection.write().await = Some(Connection {
            monitor: Arc::clone(&monitor),
            poller,
        });
        Ok(monitor)
    }

    /// Start [`connect`](Self::connect) without waiting on the wallet. Failures
    /// are logged and leave the state disconnected.
    pub fn connect_in_background(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            match state.connect().await {
                Ok(monitor) => info!(state = ?monitor.state(), "Wallet connected"),
                Err(e) => warn!(error = %e, kind = %e.kind(), "Wallet not connected"),
            }
        })
    }

    /// Monitor of the current session, if connected.
    pub async fn monitor(&self) -> Option<Arc<SaleMonitor>> {
        self.connection
            .read()
            .await
            .as_ref()
            .map(|c| Arc::clone(&c.monitor))
    }

    /// Cached snapshot; `Disconnected` when no wallet is connected.
    pub async fn snapshot(&self) -> SaleSnapshot {
        match self.monitor().await {
            Some(monitor) => monitor.snapshot(),
            None => SaleSnapshot::default(),
        }
    }

    /// Stop the poll loops of the current session.
    pub async fn disconnect(&self) {
        let connection = self.connection.write().await.take();
        if let Some(connection) = connection {
            connection.poller.shutdown().await;
            info!("Wallet session closed");
        }
    }
}
