//! Security audit logging for account and authentication events
//!
//! All audit events are logged at INFO level with the "audit" target,
//! making them easy to filter and route to security monitoring systems.
//! Events never carry passwords or password hashes.

use axum::http::{header, HeaderMap};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    RegistrationSuccess {
        user_id: String,
        email: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    RegistrationFailure {
        email: Option<String>,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    LoginSuccess {
        user_id: String,
        email: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    LoginFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Invalid, expired or wrongly signed token presented
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    UserUpdated {
        user_id: String,
        ip_address: Option<String>,
    },

    UserDeleted {
        user_id: String,
        email: String,
        ip_address: Option<String>,
    },
}

impl AuditEvent {
    /// Short human-readable label used as the log message
    pub fn summary(&self) -> &'static str {
        match self {
            Self::RegistrationSuccess { .. } => "Registration successful",
            Self::RegistrationFailure { .. } => "Registration failed",
            Self::LoginSuccess { .. } => "Login successful",
            Self::LoginFailure { .. } => "Login failed",
            Self::InvalidToken { .. } => "Invalid token",
            Self::UserUpdated { .. } => "User updated",
            Self::UserDeleted { .. } => "User deleted",
        }
    }

    /// Account the event concerns, when known
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::RegistrationSuccess { user_id, .. }
            | Self::LoginSuccess { user_id, .. }
            | Self::UserUpdated { user_id, .. }
            | Self::UserDeleted { user_id, .. } => Some(user_id.as_str()),
            Self::RegistrationFailure { .. }
            | Self::LoginFailure { .. }
            | Self::InvalidToken { .. } => None,
        }
    }

    pub fn ip_address(&self) -> Option<&str> {
        match self {
            Self::RegistrationSuccess { ip_address, .. }
            | Self::RegistrationFailure { ip_address, .. }
            | Self::LoginSuccess { ip_address, .. }
            | Self::LoginFailure { ip_address, .. }
            | Self::InvalidToken { ip_address, .. }
            | Self::UserUpdated { ip_address, .. }
            | Self::UserDeleted { ip_address, .. } => ip_address.as_deref(),
        }
    }
}

/// Emit an audit event on the `audit` target
///
/// The whole event is serialized to JSON in the `event` field; `user_id` and
/// `ip_address` are repeated as top-level fields for filtering.
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    info!(
        target: "audit",
        timestamp = %Utc::now(),
        event = %event_json,
        user_id = ?event.user_id(),
        ip_address = ?event.ip_address(),
        "{}",
        event.summary()
    );
}

/// Client IP from X-Forwarded-For or X-Real-IP
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    // First entry of X-Forwarded-For is the client
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}
