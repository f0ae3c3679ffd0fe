//! Success envelope shared by every JSON endpoint

use serde::Serialize;
use utoipa::ToSchema;
use warden_core::{Claims, IssuedToken, UserProfile};

/// Successful API response
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    UserResponse = ApiResponse<UserProfile>,
    UserListResponse = ApiResponse<Vec<UserProfile>>,
    TokenResponse = ApiResponse<IssuedToken>,
    ClaimsResponse = ApiResponse<Claims>
)]
pub struct ApiResponse<T> {
    /// Always true
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}
