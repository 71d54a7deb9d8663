//! Liveness endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Payload answered on `/health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Fixed marker, `"healthy"` whenever the process can respond at all.
    pub status: &'static str,
    /// Version baked into the running binary.
    pub version: &'static str,
}

/// Answers from process state alone; the ledger store is never consulted.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Mounts the liveness route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
