//! # Crypto Devs dapp
//!
//! Wallet session client for the Crypto Devs NFT sale. Connects a wallet,
//! verifies the network, polls the sale contract and exposes the derived
//! sale state plus the mint actions over HTTP.
//!
//! ## Quick Start
//! ```bash
//! CRYPTODEVS_CONTRACT_ADDRESS=0x... cargo run --bin cryptodevs
//! ```
//!
//! ## Endpoints
//! - `GET /status` - Sale state, minted count, loading flag
//! - `GET /health` - Health check with RPC status
//! - `GET /metrics` - Prometheus counters
//! - `POST /connect` - Connect the wallet and start polling
//! - `POST /presale-mint` - Whitelisted mint during presale
//! - `POST /mint` - Public mint after presale
//! - `POST /start-presale` - Owner only

pub mod config;
pub mod contract;
mod error;
mod handlers;
pub mod metrics;
mod middleware;
pub mod monitor;
pub mod provider;
mod response;
mod router;
pub mod rpc;
mod state;
pub mod wallet;

pub use config::Config;
pub use contract::CryptoDevsContract;
pub use error::Error;
pub use monitor::{PollerHandle, SaleMonitor};
pub use router::create as create_router;
pub use rpc::RpcClient;
pub use state::AppState;
pub use wallet::{NetworkGuard, Session};
