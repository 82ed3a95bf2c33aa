//! SINABE API Library
//!
//! Core functionality for the SINABE asset and inventory management backend:
//! the audit snapshot/diff engine, the persistence layer, and the HTTP API.

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
}
