//! HTTP API server for the RSVP service.
//!
//! Exposes guest lookup, status override and RSVP submission over REST,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::RsvpService;
use guest_store::GuestStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use routes::guests::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: GuestStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/v1/guests",
            get(routes::guests::get::<S>).put(routes::guests::update::<S>),
        )
        .route("/v1/guests/rsvp", post(routes::guests::submit_rsvp::<S>))
        .route("/v1/guests/party", get(routes::guests::party::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps a guest store in the shared application state.
pub fn create_state<S: GuestStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        rsvp_service: RsvpService::new(store),
    })
}
