//! OpenAPI document served at `/api-docs/openapi.json`

use crate::error::ApiError;
use crate::handlers::{auth, health, users, HealthResponse, SignInRequest};
use crate::response::{ClaimsResponse, TokenResponse, UserListResponse, UserResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use warden_core::{Claims, IssuedToken, UserDraft, UserProfile};

/// Registers the bearer JWT scheme used by `/api/auth/verify`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token returned by POST /api/auth/signin"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Warden API",
        description = "User registration, credential checks and bearer token issuance."
    ),
    paths(
        health::health_check,
        users::register_user,
        users::list_users,
        users::update_user,
        users::delete_user,
        auth::sign_in,
        auth::verify_token,
    ),
    components(schemas(
        UserDraft,
        UserProfile,
        SignInRequest,
        IssuedToken,
        Claims,
        ApiError,
        HealthResponse,
        UserResponse,
        UserListResponse,
        TokenResponse,
        ClaimsResponse,
    )),
    tags(
        (name = "users", description = "User registration and management"),
        (name = "auth", description = "Sign-in and token verification"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;
