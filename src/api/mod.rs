//! API routes and handlers

use axum::{routing::get, Router};

use crate::AppState;

mod audit_logs;
mod auth;
mod health;
mod inventories;

pub use health::*;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth::public_routes())
}

/// Protected API routes (authentication required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/inventories", inventories::routes())
        .nest("/audit-logs", audit_logs::routes())
}
