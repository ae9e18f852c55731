//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes
//! - The `Idempotency-Key` extractor
//! - Error and replay response rendering

pub mod error;
pub mod extractors;
pub mod response;
pub mod routes;

use axum::Router;
use paylane_db::IdempotencyRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Merchant endpoint notified of payment events, if configured.
    pub merchant_url: Option<Arc<str>>,
}

impl AppState {
    /// Creates the state from a pool and an optional merchant webhook URL.
    #[must_use]
    pub fn new(db: DatabaseConnection, merchant_url: Option<String>) -> Self {
        Self {
            db: Arc::new(db),
            merchant_url: merchant_url.map(Arc::from),
        }
    }

    /// Idempotency guard over the shared pool.
    #[must_use]
    pub fn idempotency(&self) -> IdempotencyRepository {
        IdempotencyRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
