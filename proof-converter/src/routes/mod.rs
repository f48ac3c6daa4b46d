//! HTTP Routes for the Proof Converter
//!
//! Provides REST API endpoints for conversion and validation.

pub mod convert;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all routes
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .nest("/api/v1", convert::routes())
        .with_state(state)
}
