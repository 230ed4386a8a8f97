//! State-changing calls: presale mint, public mint, start presale.

use super::SaleMonitor;
use crate::metrics::METRICS;
use crate::provider::TransactionReceipt;
use cryptodevs_types::SaleSnapshot;
use std::sync::atomic::Ordering;
use tokio::sync::watch;
use tracing::{info, warn};

/// RAII guard for the `loading` flag. Only one guard exists at a time.
struct LoadingGuard<'a> {
    snapshot: &'a watch::Sender<SaleSnapshot>,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(snapshot: &'a watch::Sender<SaleSnapshot>) -> Result<Self, crate::Error> {
        let mut acquired = false;
        snapshot.send_if_modified(|s| {
            if s.loading {
                return false;
            }
            s.loading = true;
            acquired = true;
            true
        });
        if !acquired {
            return Err(crate::Error::Busy);
        }
        Ok(Self { snapshot })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.snapshot.send_modify(|s| s.loading = false);
    }
}

impl SaleMonitor {
    /// Whitelisted mint during the presale.
    pub async fn presale_mint(&self) -> Result<TransactionReceipt, crate::Error> {
        let _loading = LoadingGuard::acquire(&self.snapshot)?;
        let result = async {
            self.contract
                .presale_mint(self.mint_price)
                .await?
                .wait()
                .await
        }
        .await;
        record_outcome("presaleMint", &result);
        result
    }

    /// Public mint after the presale.
    pub async fn mint(&self) -> Result<TransactionReceipt, crate::Error> {
        let _loading = LoadingGuard::acquire(&self.snapshot)?;
        let result = async { self.contract.mint(self.mint_price).await?.wait().await }.await;
        record_outcome("mint", &result);
        result
    }

    /// Owner only. Re-reads the presale flag once confirmed.
    pub async fn start_presale(&self) -> Result<TransactionReceipt, crate::Error> {
        let receipt = {
            let _loading = LoadingGuard::acquire(&self.snapshot)?;
            let result = async { self.contract.start_presale().await?.wait().await }.await;
            record_outcome("startPresale", &result);
            result?
        };

        if let Err(e) = self.refresh_presale_started().await {
            warn!(error = %e, "Presale flag refresh after start failed");
        }
        Ok(receipt)
    }
}

fn record_outcome(method: &str, result: &Result<TransactionReceipt, crate::Error>) {
    match result {
        Ok(receipt) => {
            info!(method, tx_hash = %receipt.transaction_hash, "Transaction succeeded");
        }
        Err(e) => {
            METRICS.tx_failed.fetch_add(1, Ordering::Relaxed);
            warn!(method, error = %e, kind = %e.kind(), "Transaction failed");
        }
    }
}
