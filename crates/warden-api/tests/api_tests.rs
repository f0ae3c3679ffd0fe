//! API Integration Tests
//!
//! Every test drives the router over the in-memory store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use warden_api::create_router_for_testing;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn bearer_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        create_json_request(
            "POST",
            "/api/users",
            Some(json!({ "name": name, "email": email, "password": password })),
        ),
    )
    .await
}

async fn sign_in(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        create_json_request(
            "POST",
            "/api/auth/signin",
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["backend"], "memory");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/api-docs/openapi.json", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/auth/signin"].is_object());
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_register_user() {
    let app = create_router_for_testing();

    let (status, json) = register(&app, "Ann", "ann@x.com", "secret1").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "User created");
    assert!(json["data"]["id"].is_string());
    assert_eq!(json["data"]["name"], "Ann");
    assert_eq!(json["data"]["email"], "ann@x.com");
    assert!(json["data"].get("password").is_none());
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request("POST", "/api/users", Some(json!({ "email": "not-an-email", "password": "123" }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Invalid user data");
    assert_eq!(json["errors"]["name"], "Name is required");
    assert_eq!(json["errors"]["email"], "Email is not valid");
    assert_eq!(json["errors"]["password"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn test_register_rejects_non_string_fields() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/api/users",
            Some(json!({ "name": 42, "email": "ann@x.com", "password": "secret1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"]["name"], "Name must be a string");
    assert!(json["errors"].get("email").is_none());
}

#[tokio::test]
async fn test_register_rejects_malformed_json() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_router_for_testing();

    let (status, _) = register(&app, "Ann", "ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = register(&app, "Other Ann", "ann@x.com", "secret2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

// =============================================================================
// User Management Tests
// =============================================================================

#[tokio::test]
async fn test_list_users() {
    let app = create_router_for_testing();

    register(&app, "Ann", "ann@x.com", "secret1").await;
    register(&app, "Bob", "bob@x.com", "secret2").await;

    let (status, json) = send(&app, create_json_request("GET", "/api/users", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Users retrieved");
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_update_user() {
    let app = create_router_for_testing();

    let (_, created) = register(&app, "Ann", "ann@x.com", "secret1").await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        create_json_request(
            "PUT",
            &format!("/api/users/{id}"),
            Some(json!({ "name": "Ann Smith", "email": "ann@x.com", "password": "secret9" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User updated");
    assert_eq!(json["data"]["name"], "Ann Smith");

    let (status, _) = sign_in(&app, "ann@x.com", "secret9").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = sign_in(&app, "ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_missing_user() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request(
            "PUT",
            "/api/users/999",
            Some(json!({ "name": "Ann", "email": "ann@x.com", "password": "secret1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn test_update_validates_payload() {
    let app = create_router_for_testing();

    let (_, created) = register(&app, "Ann", "ann@x.com", "secret1").await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        create_json_request(
            "PUT",
            &format!("/api/users/{id}"),
            Some(json!({ "name": "Ann", "email": "ann@x.com" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"]["password"], "Password is required");
}

#[tokio::test]
async fn test_delete_user() {
    let app = create_router_for_testing();

    let (_, created) = register(&app, "Ann", "ann@x.com", "secret1").await;
    let id = created["data"]["id"].as_str().unwrap();
    let uri = format!("/api/users/{id}");

    let (status, json) = send(&app, create_json_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User deleted");
    assert_eq!(json["data"]["email"], "ann@x.com");

    let (status, json) = send(&app, create_json_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Failed to delete user");
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_sign_in() {
    let app = create_router_for_testing();
    register(&app, "Ann", "ann@x.com", "secret1").await;

    let (status, json) = sign_in(&app, "ann@x.com", "secret1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert!(json["data"]["access_token"].as_str().unwrap().contains('.'));
    assert!(json["data"]["expires_in"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let app = create_router_for_testing();
    register(&app, "Ann", "ann@x.com", "secret1").await;

    let (wrong_status, wrong_json) = sign_in(&app, "ann@x.com", "wrong-password").await;
    let (unknown_status, unknown_json) = sign_in(&app, "nobody@x.com", "secret1").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_json, unknown_json);
    assert_eq!(wrong_json["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_sign_in_with_missing_fields() {
    let app = create_router_for_testing();
    register(&app, "Ann", "ann@x.com", "secret1").await;

    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/auth/signin", Some(json!({ "email": "ann@x.com" }))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_without_token() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/api/auth/verify", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_verify_with_garbage_token() {
    let app = create_router_for_testing();

    let (status, _) = send(&app, bearer_request("/api/auth/verify", "abc.def.ghi")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_with_wrong_scheme() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .uri("/api/auth/verify")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Full Flow
// =============================================================================

#[tokio::test]
async fn test_register_sign_in_verify_delete() {
    let app = create_router_for_testing();

    let (status, created) = register(&app, "Ann", "ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, signed_in) = sign_in(&app, "ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    let token = signed_in["data"]["access_token"].as_str().unwrap();

    let (status, verified) = send(&app, bearer_request("/api/auth/verify", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["message"], "Token is valid");
    assert_eq!(verified["data"]["sub"], id.as_str());
    assert_eq!(verified["data"]["name"], "Ann");
    assert_eq!(verified["data"]["email"], "ann@x.com");
    assert!(verified["data"].get("password").is_none());

    let (status, _) = send(
        &app,
        create_json_request("DELETE", &format!("/api/users/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, create_json_request("GET", "/api/users", None)).await;
    assert!(listed["data"].as_array().unwrap().is_empty());

    // Token stays valid until expiry even after the user is gone
    let (status, _) = send(&app, bearer_request("/api/auth/verify", token)).await;
    assert_eq!(status, StatusCode::OK);
}
