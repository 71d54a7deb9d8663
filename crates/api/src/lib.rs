//! HTTP API layer with Axum routes.
//!
//! Translates transport requests into validated domain requests, dispatches
//! them to the ledger engine and maps every typed failure onto a status code
//! and the one-field error envelope.

pub mod error;
pub mod routes;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tally_db::LedgerEngine;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger engine over the process-wide connection pool.
    pub engine: LedgerEngine,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
