//! HTTP routes for the auth gate.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{authenticate, authorize};
use crate::store::UserStore;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    /// User persistence backend.
    pub store: Arc<dyn UserStore>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `POST /login`, `POST /logout`, `POST /register` - session endpoints (public list)
/// - `GET /verify-server-token` - peer token verification (public list)
/// - `GET /account` - identity echo (authenticated, role-check exempt)
/// - `GET /users`, `GET /users/{id}` - protected resources
/// - `GET /health` - liveness probe, outside the guarded set
/// - `GET /metrics` - Prometheus metrics endpoint, outside the guarded set
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    // Every route in the guarded set traverses both middlewares; the
    // public list is consulted inside them, not here, so a /login
    // request still passes through the chain. `.layer` rather than
    // `.route_layer` so the 404 fallback is guarded too.
    let guarded_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/register", post(handlers::register))
        .route("/verify-server-token", get(handlers::verify_server_token))
        .route("/account", get(handlers::account))
        .route("/users", get(handlers::list_users))
        .route("/users/:id", get(handlers::get_user))
        .fallback(handlers::not_found)
        // Layers run outermost-last-added: authenticate first, then
        // authorize, then the handler.
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state);

    // Operational endpoints bypass the guard chain entirely.
    let ops_routes = Router::new().route("/health", get(handlers::health_check));

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    guarded_routes
        .merge(ops_routes)
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
