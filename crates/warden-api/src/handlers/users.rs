//! User management handlers

use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::error::{ApiError, AppError};
use crate::response::{ApiResponse, UserListResponse, UserResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use warden_core::UserDraft;

/// Register a new user
///
/// Every field is validated and all failures are reported together.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = UserDraft,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid user data", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
    )
)]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(draft) = payload?;
    let email = draft.email.clone();

    match state.users.register(draft).await {
        Ok(user) => {
            audit_log(&AuditEvent::RegistrationSuccess {
                user_id: user.id.clone(),
                email: user.email.clone(),
                ip_address: extract_ip_address(&headers),
                user_agent: extract_user_agent(&headers),
            });
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::new("User created", user)),
            ))
        }
        Err(e) => {
            audit_log(&AuditEvent::RegistrationFailure {
                email,
                reason: e.to_string(),
                ip_address: extract_ip_address(&headers),
                user_agent: extract_user_agent(&headers),
            });
            Err(e.into())
        }
    }
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = UserListResponse),
    )
)]
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let users = state.users.list().await?;
    Ok(Json(ApiResponse::new("Users retrieved", users)))
}

/// Update a user's profile
///
/// The body must carry the complete record, including the plaintext
/// password, which is re-hashed on every update.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = UserDraft,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid user data", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(draft) = payload?;
    let user = state.users.update_profile(&id, draft).await?;

    audit_log(&AuditEvent::UserUpdated {
        user_id: user.id.clone(),
        ip_address: extract_ip_address(&headers),
    });

    Ok(Json(ApiResponse::new("User updated", user)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = UserResponse),
        (status = 400, description = "Deletion failed", body = ApiError),
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.remove(&id).await?;

    audit_log(&AuditEvent::UserDeleted {
        user_id: user.id.clone(),
        email: user.email.clone(),
        ip_address: extract_ip_address(&headers),
    });

    Ok(Json(ApiResponse::new("User deleted", user)))
}
