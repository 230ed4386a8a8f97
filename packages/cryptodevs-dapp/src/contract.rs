//! Crypto Devs sale contract bindings.

use crate::metrics::METRICS;
use crate::provider::{self, TransactionReceipt};
use crate::wallet::Session;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

sol! {
    #[derive(Debug)]
    interface CryptoDevs {
        // View functions
        function presaleStarted() external view returns (bool);
        function presaleEnded() external view returns (uint256);
        function owner() external view returns (address);
        function tokenIds() external view returns (uint256);

        // State-changing functions
        function presaleMint() external payable;
        function mint() external payable;
        function startPresale() external;
    }
}

/// The deployed sale contract, reached through a wallet session.
#[derive(Clone)]
pub struct CryptoDevsContract {
    session: Arc<Session>,
    address: Address,
    receipt_poll: Duration,
}

impl CryptoDevsContract {
    pub fn new(session: Arc<Session>, address: Address, receipt_poll: Duration) -> Self {
        Self {
            session,
            address,
            receipt_poll,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ========== View Functions ==========

    pub async fn presale_started(&self) -> Result<bool, crate::Error> {
        let result = self.call(CryptoDevs::presaleStartedCall {}).await?;
        Ok(result._0)
    }

    /// Presale end, seconds since epoch. Saturates at `u64::MAX`.
    pub async fn presale_ended(&self) -> Result<u64, crate::Error> {
        let result = self.call(CryptoDevs::presaleEndedCall {}).await?;
        let end = result._0;
        if end > U256::from(u64::MAX) {
            return Ok(u64::MAX);
        }
        Ok(end.as_limbs()[0])
    }

    pub async fn owner(&self) -> Result<Address, crate::Error> {
        let result = self.call(CryptoDevs::ownerCall {}).await?;
        Ok(result._0)
    }

    pub async fn token_ids(&self) -> Result<U256, crate::Error> {
        let result = self.call(CryptoDevs::tokenIdsCall {}).await?;
        Ok(result._0)
    }

    // ========== State-changing Functions ==========

    /// Whitelist-only mint; the contract rejects other addresses.
    pub async fn presale_mint(&self, value: U256) -> Result<PendingTx, crate::Error> {
        self.transact(CryptoDevs::presaleMintCall {}, Some(value))
            .await
    }

    pub async fn mint(&self, value: U256) -> Result<PendingTx, crate::Error> {
        self.transact(CryptoDevs::mintCall {}, Some(value)).await
    }

    /// Owner only.
    pub async fn start_presale(&self) -> Result<PendingTx, crate::Error> {
        self.transact(CryptoDevs::startPresaleCall {}, None).await
    }

    async fn call<C>(&self, call: C) -> Result<C::Return, crate::Error>
    where
        C: SolCall + Send,
    {
        let provider = self.session.provider().await?;
        let data = provider::call(provider, self.address, call.abi_encode().into()).await?;
        C::abi_decode_returns(&data, true)
            .map_err(|e| crate::Error::Rpc(format!("decode {}: {e}", C::SIGNATURE)))
    }

    async fn transact<C>(&self, call: C, value: Option<U256>) -> Result<PendingTx, crate::Error>
    where
        C: SolCall + Send,
    {
        let signer = self.session.signer().await?;
        let hash = signer
            .send_transaction(self.address, call.abi_encode().into(), value)
            .await?;
        METRICS.tx_submitted.fetch_add(1, Ordering::Relaxed);
        info!(tx_hash = %hash, method = C::SIGNATURE, from = %signer.address(), "Transaction submitted");
        Ok(PendingTx {
            hash,
            session: Arc::clone(&self.session),
            poll: self.receipt_poll,
        })
    }
}

/// A submitted transaction awaiting inclusion.
pub struct PendingTx {
    hash: B256,
    session: Arc<Session>,
    poll: Duration,
}

impl PendingTx {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Suspend until mined. No deadline: the transport timeout bounds each
    /// poll, not the wait.
    pub async fn wait(self) -> Result<TransactionReceipt, crate::Error> {
        loop {
            let provider = self.session.provider().await?;
            match provider::transaction_receipt(provider, self.hash).await? {
                Some(receipt) if receipt.succeeded() => {
                    METRICS.tx_confirmed.fetch_add(1, Ordering::Relaxed);
                    info!(tx_hash = %self.hash, block = ?receipt.block_number, "Transaction confirmed");
                    return Ok(receipt);
                }
                Some(_) => {
                    warn!(tx_hash = %self.hash, "Transaction reverted");
                    return Err(crate::Error::Reverted {
                        tx_hash: Some(self.hash),
                        reason: "status 0".into(),
                    });
                }
                None => {
                    debug!(tx_hash = %self.hash, "Transaction pending");
                    tokio::time::sleep(self.poll).await;
                }
            }
        }
    }
}
