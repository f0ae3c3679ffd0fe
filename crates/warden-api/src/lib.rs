//! Warden API - REST server
//!
//! Exposes user registration, sign-in and token verification over HTTP.

pub mod audit;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::create_router;

use state::AppState;
use std::sync::Arc;

/// Router over an in-memory store, for integration tests
pub fn create_router_for_testing() -> axum::Router {
    create_router(Arc::new(AppState::for_testing()))
}
