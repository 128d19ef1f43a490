use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — permissive CORS on every route; the tracking script runs
///    on arbitrary third-party pages.
/// 3. `CompressionLayer` — gzip for clients that send `Accept-Encoding`.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index::index))
        .route("/health", get(routes::health::health))
        .route("/track.js", get(routes::script::track_js))
        .route("/track", post(routes::track::track))
        .route("/stats", get(routes::stats::get_stats))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
