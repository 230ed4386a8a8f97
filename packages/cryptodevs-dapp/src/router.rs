//! HTTP router setup.

use crate::handlers;
use crate::middleware::{inject_request_id, require_wallet_key};
use crate::state::AppState;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    let wallet_routes = Router::new()
        .route("/connect", post(handlers::connect))
        .route("/presale-mint", post(handlers::presale_mint))
        .route("/mint", post(handlers::mint))
        .route("/start-presale", post(handlers::start_presale))
        .route_layer(from_fn_with_state(Arc::clone(&state), require_wallet_key));

    Router::new()
        .route("/status", get(handlers::status))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(wallet_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(from_fn(inject_request_id)),
        )
        .with_state(state)
}
