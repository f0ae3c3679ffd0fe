//! API request handlers

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{sign_in, verify_token, SignInRequest};
pub use health::{health_check, HealthResponse};
pub use users::{delete_user, list_users, register_user, update_user};
