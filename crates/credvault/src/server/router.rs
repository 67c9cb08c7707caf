//! Axum router construction.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, state::AppState};

/// Upper bound on one request, scrypt included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the application [`Router`] with all routes and layers attached.
///
/// Layers: request tracing, the [`REQUEST_TIMEOUT`] deadline, and response
/// compression.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/v1/credentials/encrypt", post(handlers::encrypt))
        .route("/v1/credentials/decrypt", post(handlers::decrypt))
        .route("/v1/credentials/rotate", post(handlers::rotate))
        .route("/v1/credentials/inspect", post(handlers::inspect))
        .route("/v1/credentials/mask", post(handlers::mask))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
