//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod charges;
pub mod health;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(charges::routes())
}
