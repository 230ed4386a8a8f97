//! Prometheus metrics (lock-free atomics).

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Polling ---
    pub phase_polls: AtomicU64,
    pub count_polls: AtomicU64,
    pub poll_errors: AtomicU64,

    // --- Transactions ---
    pub tx_submitted: AtomicU64,
    pub tx_confirmed: AtomicU64,
    pub tx_failed: AtomicU64,

    // --- RPC ---
    pub rpc_failovers: AtomicU64,
    pub rpc_errors: AtomicU64,
    pub network_mismatches: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            phase_polls: AtomicU64::new(0),
            count_polls: AtomicU64::new(0),
            poll_errors: AtomicU64::new(0),
            tx_submitted: AtomicU64::new(0),
            tx_confirmed: AtomicU64::new(0),
            tx_failed: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
            network_mismatches: AtomicU64::new(0),
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, tokens_minted: &str, loading: bool) -> String {
        let phase_polls = self.phase_polls.load(Ordering::Relaxed);
        let count_polls = self.count_polls.load(Ordering::Relaxed);
        let poll_errors = self.poll_errors.load(Ordering::Relaxed);
        let tx_submitted = self.tx_submitted.load(Ordering::Relaxed);
        let tx_confirmed = self.tx_confirmed.load(Ordering::Relaxed);
        let tx_failed = self.tx_failed.load(Ordering::Relaxed);
        let rpc_failovers = self.rpc_failovers.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);
        let network_mismatches = self.network_mismatches.load(Ordering::Relaxed);
        let loading = u8::from(loading);

        format!(
            "\
# HELP cryptodevs_phase_polls_total Presale phase poll ticks.\n\
# TYPE cryptodevs_phase_polls_total counter\n\
cryptodevs_phase_polls_total {phase_polls}\n\
# HELP cryptodevs_count_polls_total Minted-count poll ticks.\n\
# TYPE cryptodevs_count_polls_total counter\n\
cryptodevs_count_polls_total {count_polls}\n\
# HELP cryptodevs_poll_errors_total Failed contract reads during polling.\n\
# TYPE cryptodevs_poll_errors_total counter\n\
cryptodevs_poll_errors_total {poll_errors}\n\
# HELP cryptodevs_tx_submitted_total Transactions handed to the wallet.\n\
# TYPE cryptodevs_tx_submitted_total counter\n\
cryptodevs_tx_submitted_total {tx_submitted}\n\
# HELP cryptodevs_tx_confirmed_total Transactions mined successfully.\n\
# TYPE cryptodevs_tx_confirmed_total counter\n\
cryptodevs_tx_confirmed_total {tx_confirmed}\n\
# HELP cryptodevs_tx_failed_total Rejected, reverted or failed transactions.\n\
# TYPE cryptodevs_tx_failed_total counter\n\
cryptodevs_tx_failed_total {tx_failed}\n\
# HELP cryptodevs_rpc_failovers_total RPC primary-to-fallback failovers.\n\
# TYPE cryptodevs_rpc_failovers_total counter\n\
cryptodevs_rpc_failovers_total {rpc_failovers}\n\
# HELP cryptodevs_rpc_errors_total RPC errors.\n\
# TYPE cryptodevs_rpc_errors_total counter\n\
cryptodevs_rpc_errors_total {rpc_errors}\n\
# HELP cryptodevs_network_mismatch_total Calls aborted by the chain id guard.\n\
# TYPE cryptodevs_network_mismatch_total counter\n\
cryptodevs_network_mismatch_total {network_mismatches}\n\
# HELP cryptodevs_tokens_minted Last observed tokenIds().\n\
# TYPE cryptodevs_tokens_minted gauge\n\
cryptodevs_tokens_minted {tokens_minted}\n\
# HELP cryptodevs_loading Transaction awaiting confirmation.\n\
# TYPE cryptodevs_loading gauge\n\
cryptodevs_loading {loading}\n"
        )
    }
}
