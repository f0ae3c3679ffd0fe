//! Authentication API handlers

use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::error::{ApiError, AppError};
use crate::response::{ApiResponse, ClaimsResponse, TokenResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use warden_core::user::lenient_string;
use warden_core::Claims;

/// Sign-in request
///
/// Missing or non-string fields are treated as wrong credentials.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignInRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(example = "johndoe@email.com")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(example = "helloworld")]
    pub password: Option<String>,
}

/// Sign in with email and password
///
/// Returns a signed bearer token. A wrong password and an unknown email
/// produce the same response.
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
    )
)]
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    match state.auth.authenticate(&email, &password).await {
        Ok((user, token)) => {
            audit_log(&AuditEvent::LoginSuccess {
                user_id: user.id,
                email: user.email,
                ip_address: extract_ip_address(&headers),
                user_agent: extract_user_agent(&headers),
            });
            Ok(Json(ApiResponse::new("Signed in", token)))
        }
        Err(e) => {
            audit_log(&AuditEvent::LoginFailure {
                email,
                reason: e.to_string(),
                ip_address: extract_ip_address(&headers),
                user_agent: extract_user_agent(&headers),
            });
            Err(e.into())
        }
    }
}

/// Decode the caller's bearer token
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "auth",
    responses(
        (status = 200, description = "Token is valid", body = ClaimsResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_token(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(ApiResponse::new("Token is valid", claims))
}
