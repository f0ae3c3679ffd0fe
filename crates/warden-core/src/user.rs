//! User entity and field validation
//!
//! A [`UserDraft`] is the transient entity built from a registration or
//! update payload. It owns the validation rules and, once valid, the step
//! that replaces the plaintext password with its hash. A [`User`] is the
//! record as the repository stores it.

use crate::password::{CredentialHasher, PasswordError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;
use validator::ValidateEmail;

/// Maximum name length, in characters
pub const MAX_NAME_LENGTH: usize = 100;

/// Minimum plaintext password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A validated user field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Password,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable message per failing field
pub type FieldErrors = BTreeMap<Field, String>;

/// Result of running every validation rule on a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// User data as received from a caller, before validation and hashing
///
/// A field that is absent, `null`, or not a JSON string deserializes to
/// `None` and is reported by the validator as "must be a string".
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct UserDraft {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(example = "John Doe")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(example = "johndoe@email.com")]
    pub email: Option<String>,

    /// Plaintext; only lives until it is hashed
    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(example = "helloworld")]
    pub password: Option<String>,
}

impl fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDraft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Deserialize any JSON value, keeping only strings
///
/// For use with `#[serde(default, deserialize_with = "lenient_string")]`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn check_name(name: Option<&str>) -> Result<(), String> {
    let name = name.ok_or_else(|| "Name must be a string".to_string())?;
    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name must be at most {MAX_NAME_LENGTH} characters"));
    }
    Ok(())
}

fn check_email(email: Option<&str>) -> Result<(), String> {
    let email = email.ok_or_else(|| "Email must be a string".to_string())?;
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if !email.validate_email() {
        return Err("Email is not valid".to_string());
    }
    Ok(())
}

fn check_password(password: Option<&str>) -> Result<(), String> {
    let password = password.ok_or_else(|| "Password must be a string".to_string())?;
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

impl UserDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    pub fn validate_name(&self) -> Result<(), String> {
        check_name(self.name.as_deref())
    }

    pub fn validate_email(&self) -> Result<(), String> {
        check_email(self.email.as_deref())
    }

    /// Applies to the plaintext only, never to a stored hash
    pub fn validate_password(&self) -> Result<(), String> {
        check_password(self.password.as_deref())
    }

    /// Run every rule (name, email, password) and collect all failures
    pub fn validate_all(&self) -> ValidationOutcome {
        let mut errors = FieldErrors::new();
        let checks = [
            (Field::Name, self.validate_name()),
            (Field::Email, self.validate_email()),
            (Field::Password, self.validate_password()),
        ];
        for (field, result) in checks {
            if let Err(message) = result {
                errors.insert(field, message);
            }
        }

        if errors.is_empty() {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid(errors)
        }
    }

    /// Consume the draft, returning the validated fields or every field error
    pub fn validated(self) -> Result<ValidatedUser, FieldErrors> {
        match self.validate_all() {
            ValidationOutcome::Invalid(errors) => Err(errors),
            // Every rule rejects a missing field, so all three are present
            ValidationOutcome::Valid => Ok(ValidatedUser {
                name: self.name.unwrap_or_default(),
                email: self.email.unwrap_or_default(),
                password: self.password.unwrap_or_default(),
            }),
        }
    }
}

/// A draft that passed every rule; the password is still plaintext
pub struct ValidatedUser {
    name: String,
    email: String,
    password: String,
}

impl ValidatedUser {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Hash the password and produce a record ready for insertion
    pub fn into_new_user(self, hasher: &CredentialHasher) -> Result<NewUser, PasswordError> {
        let password_hash = hasher.hash(&self.password)?;
        Ok(NewUser {
            name: self.name,
            email: self.email,
            password_hash,
        })
    }

    /// Hash the password and produce a full change set for an update
    pub fn into_changes(self, hasher: &CredentialHasher) -> Result<UserChanges, PasswordError> {
        let password_hash = hasher.hash(&self.password)?;
        Ok(UserChanges {
            name: Some(self.name),
            email: Some(self.email),
            password_hash: Some(password_hash),
        })
    }
}

/// Insert payload handed to a repository; the password is already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// User record as stored by a repository
///
/// The identifier and timestamps are assigned by storage. The password is
/// always an Argon2id PHC hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public representation without the password hash
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User record safe to hand back to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "johndoe@email.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
