//! Sale-status monitor: a cached, eventually-consistent mirror of the sale
//! contract for one wallet session.
//!
//! Reads refresh the cache; [`SaleMonitor::state`] derives the UI state from
//! it. Poll loops live in `polling`, state-changing calls in `actions`.

mod actions;
mod polling;

pub use polling::PollerHandle;

use crate::contract::CryptoDevsContract;
use alloy_primitives::U256;
use cryptodevs_types::{presale_has_ended, SaleSnapshot, SaleState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Wall clock in seconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

pub struct SaleMonitor {
    pub(crate) contract: CryptoDevsContract,
    pub(crate) snapshot: watch::Sender<SaleSnapshot>,
    clock: Clock,
    mint_price: U256,
}

impl SaleMonitor {
    /// Monitor for a freshly connected session. Nothing is read until the
    /// first refresh.
    pub fn new(contract: CryptoDevsContract, mint_price: U256) -> Self {
        let (snapshot, _) = watch::channel(SaleSnapshot::connected());
        Self {
            contract,
            snapshot,
            clock: Arc::new(now_secs),
            mint_price,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn contract(&self) -> &CryptoDevsContract {
        &self.contract
    }

    pub fn snapshot(&self) -> SaleSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Notified on every cache change.
    pub fn subscribe(&self) -> watch::Receiver<SaleSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn state(&self) -> SaleState {
        self.snapshot.borrow().state()
    }

    /// Read `presaleStarted()`; before the start also resolve ownership.
    ///
    /// Returns the cached flag. A failed flag read caches nothing; a failed
    /// owner read leaves `is_owner` as it was.
    pub async fn refresh_presale_started(&self) -> Result<bool, crate::Error> {
        let started = self.contract.presale_started().await?;

        if !started {
            match self.contract.owner().await {
                Ok(owner) => {
                    let is_owner = owner == self.contract.session().address();
                    if self.snapshot.send_if_modified(|s| s.observe_owner(is_owner)) {
                        info!(%owner, is_owner, "Owner status updated");
                    }
                }
                Err(e) => warn!(error = %e, "Owner lookup failed"),
            }
        }

        if self
            .snapshot
            .send_if_modified(|s| s.observe_presale_started(started))
        {
            info!("Presale started");
        }
        Ok(self.snapshot.borrow().presale_started)
    }

    /// Compare `presaleEnded()` against the wall clock. Once ended, stays ended.
    pub async fn refresh_presale_ended(&self) -> Result<bool, crate::Error> {
        let end = self.contract.presale_ended().await?;
        let now = (self.clock)();
        let ended = presale_has_ended(end, now);
        debug!(end, now, ended, "Presale end checked");

        if self
            .snapshot
            .send_if_modified(|s| s.observe_presale_ended(ended))
        {
            info!(end, "Presale ended, public mint open");
        }
        Ok(self.snapshot.borrow().presale_ended)
    }

    /// Read `tokenIds()`. Unchanged values do not notify subscribers.
    pub async fn refresh_minted_count(&self) -> Result<String, crate::Error> {
        let minted = self.contract.token_ids().await?.to_string();
        if self.snapshot.send_if_modified(|s| s.observe_minted(&minted)) {
            debug!(minted = %minted, "Minted count updated");
        }
        Ok(minted)
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

// --- Test helpers (shared across sub-module tests) ---
