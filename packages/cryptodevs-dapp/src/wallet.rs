//! Wallet session: the provider, the connected account and the network guard.
//!
//! A [`Session`] is created once by [`Session::connect`] and passed explicitly
//! to everything that talks to the chain. Every provider acquisition goes
//! through the guard, so no contract call is issued on the wrong chain.

use crate::metrics::METRICS;
use crate::provider::{self, Provider, TransactionRequest};
use alloy_primitives::{Address, Bytes, B256, U256};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Required chain identity.
#[derive(Debug, Clone)]
pub struct NetworkGuard {
    pub chain_id: u64,
    pub name: String,
}

impl NetworkGuard {
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
        }
    }

    /// Fails with [`crate::Error::WrongNetwork`] unless the provider is on the required chain.
    pub async fn verify(&self, provider: &dyn Provider) -> Result<(), crate::Error> {
        let actual = provider::chain_id(provider).await?;
        if actual != self.chain_id {
            METRICS.network_mismatches.fetch_add(1, Ordering::Relaxed);
            warn!(
                expected = self.chain_id,
                actual,
                network = %self.name,
                "Wrong network, change the wallet network"
            );
            return Err(crate::Error::WrongNetwork {
                expected: self.chain_id,
                actual,
                network: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// A connected wallet.
pub struct Session {
    provider: Arc<dyn Provider>,
    address: Address,
    guard: NetworkGuard,
}

impl Session {
    /// Verify the network, then ask the wallet for account access.
    pub async fn connect(
        provider: Arc<dyn Provider>,
        guard: NetworkGuard,
    ) -> Result<Self, crate::Error> {
        guard.verify(provider.as_ref()).await?;
        let accounts = provider::request_accounts(provider.as_ref()).await?;
        let address = accounts
            .into_iter()
            .next()
            .ok_or_else(|| crate::Error::UserRejected("wallet returned no accounts".into()))?;
        info!(%address, network = %guard.name, "Wallet connected");
        Ok(Self {
            provider,
            address,
            guard,
        })
    }

    /// Connected account; fixed for the session lifetime.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn network(&self) -> &NetworkGuard {
        &self.guard
    }

    /// Read-only provider, after the network check.
    pub async fn provider(&self) -> Result<&dyn Provider, crate::Error> {
        self.guard.verify(self.provider.as_ref()).await?;
        Ok(self.provider.as_ref())
    }

    /// Signer bound to the provider, after the network check.
    pub async fn signer(&self) -> Result<SignerHandle<'_>, crate::Error> {
        let provider = self.provider().await?;
        Ok(SignerHandle {
            provider,
            address: self.address,
        })
    }
}

/// Authorizes state-changing calls through the wallet.
pub struct SignerHandle<'a> {
    provider: &'a dyn Provider,
    address: Address,
}

impl SignerHandle<'_> {
    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn send_transaction(
        &self,
        to: Address,
        data: Bytes,
        value: Option<U256>,
    ) -> Result<B256, crate::Error> {
        let tx = TransactionRequest {
            from: self.address,
            to,
            data,
            value,
        };
        provider::send_transaction(self.provider, &tx).await
    }
}
