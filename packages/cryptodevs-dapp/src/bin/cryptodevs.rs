//! Crypto Devs dapp binary.

use cryptodevs_dapp::{create_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Crypto Devs dapp");

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("cryptodevs").required(false))
        .add_source(config::Environment::with_prefix("CRYPTODEVS"))
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|e| {
            let err_str = format!("{e}");
            if err_str.contains("not found") {
                warn!(error = %e, "No config file found, using defaults");
                Config::default()
            } else {
                error!(error = %e, "FATAL: Config error, fix env vars or cryptodevs.toml");
                std::process::exit(1);
            }
        });

    if config.api_key().is_some() {
        info!("API key auth enabled");
    } else {
        warn!("CRYPTODEVS_API_KEY not set, wallet routes are unprotected (dev mode)");
    }

    info!(
        contract = %config.contract_address,
        rpc = %config.rpc_url,
        chain_id = config.chain_id,
        network = %config.network_name,
        "Configuration loaded"
    );

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config)?);

    // Serve while the wallet prompt is open. An unreachable or declined
    // wallet leaves the page disconnected; POST /connect retries.
    let initial_connect = state.connect_in_background();

    let app = create_router(state.clone());

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, waiting for pending mint...");

    let drain_deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    loop {
        if !state.snapshot().await.loading {
            break;
        }
        if tokio::time::Instant::now() >= drain_deadline {
            warn!("Drain timeout, pending transaction left unconfirmed");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    initial_connect.abort();
    state.disconnect().await;

    info!("Crypto Devs dapp shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
