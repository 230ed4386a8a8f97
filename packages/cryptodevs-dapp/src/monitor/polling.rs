//! Fixed-interval poll loops.
//!
//! Two independent tasks share one cancellation token: the phase loop stops
//! by itself once the presale has ended, the count loop runs until teardown.

use super::SaleMonitor;
use crate::metrics::METRICS;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns both poll tasks. Dropping it does not stop them; call [`shutdown`](Self::shutdown).
pub struct PollerHandle {
    cancel: CancellationToken,
    phase: JoinHandle<()>,
    count: JoinHandle<()>,
}

impl PollerHandle {
    /// Whether the phase loop is still running (false once the sale is public).
    pub fn is_phase_polling(&self) -> bool {
        !self.phase.is_finished()
    }

    pub fn is_count_polling(&self) -> bool {
        !self.count.is_finished()
    }

    /// Cancel both loops, aborting any read in flight, and wait for them.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.phase.await {
            warn!(error = %e, "Phase poller panicked");
        }
        if let Err(e) = self.count.await {
            warn!(error = %e, "Count poller panicked");
        }
        info!("Pollers stopped");
    }
}

impl SaleMonitor {
    /// Start both loops. The first evaluation runs immediately.
    pub fn spawn_pollers(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> PollerHandle {
        let phase_monitor = Arc::clone(self);
        let phase_cancel = cancel.clone();
        let phase = tokio::spawn(async move {
            phase_monitor.run_phase_poller(interval, phase_cancel).await;
        });

        let count_monitor = Arc::clone(self);
        let count_cancel = cancel.clone();
        let count = tokio::spawn(async move {
            count_monitor.run_count_poller(interval, count_cancel).await;
        });

        info!(interval_secs = interval.as_secs(), "Pollers started");
        PollerHandle {
            cancel,
            phase,
            count,
        }
    }

    pub async fn run_phase_poller(&self, interval: Duration, cancel: CancellationToken) {
        loop {
            let ended = tokio::select! {
                ended = self.phase_tick() => ended,
                _ = cancel.cancelled() => {
                    info!("Phase poller shutting down");
                    return;
                }
            };
            if ended {
                info!("Sale is public, phase poller stopped");
                return;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {},
                _ = cancel.cancelled() => {
                    info!("Phase poller shutting down");
                    return;
                }
            }
        }
    }

    pub async fn run_count_poller(&self, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = self.count_tick() => {},
                _ = cancel.cancelled() => {
                    info!("Count poller shutting down");
                    return;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {},
                _ = cancel.cancelled() => {
                    info!("Count poller shutting down");
                    return;
                }
            }
        }
    }

    /// One phase evaluation: started first, then ended only if started.
    /// Returns true once the presale has ended. Read failures count as "not yet".
    pub async fn phase_tick(&self) -> bool {
        METRICS.phase_polls.fetch_add(1, Ordering::Relaxed);
        let started = match self.refresh_presale_started().await {
            Ok(started) => started,
            Err(e) => {
                METRICS.poll_errors.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, kind = %e.kind(), "presaleStarted read failed");
                false
            }
        };
        if !started {
            return false;
        }

        match self.refresh_presale_ended().await {
            Ok(ended) => ended,
            Err(e) => {
                METRICS.poll_errors.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, kind = %e.kind(), "presaleEnded read failed");
                false
            }
        }
    }

    async fn count_tick(&self) {
        METRICS.count_polls.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.refresh_minted_count().await {
            METRICS.poll_errors.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, kind = %e.kind(), "tokenIds read failed");
        }
    }
}
