use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware, outer to inner:
/// 1. `TraceLayer`: structured request/response logging via `tracing`.
/// 2. `CorsLayer`: origins from config, permissive when none are set; the
///    API serves browser dashboards on other origins.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/dataset/load", post(routes::dataset::load))
        .route("/api/dataset/upload", post(routes::dataset::upload))
        .route("/api/events", get(routes::events::get_events))
        .route("/api/cohorts", get(routes::cohorts::get_cohorts))
        .route("/api/funnel", get(routes::funnel::get_funnel))
        .route("/api/kpis", get(routes::kpis::get_kpis))
        .route("/api/experiment", post(routes::experiment::run))
        .layer(TraceLayer::new_for_http())
        .layer(cors.allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
