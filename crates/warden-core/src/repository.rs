//! User persistence contract
//!
//! Every storage backend implements [`UserRepository`]; services depend
//! only on the trait object.

use crate::user::{NewUser, User, UserChanges};
use async_trait::async_trait;
use thiserror::Error;

/// Storage-level failures
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write; carries the offending key
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Record not found")]
    NotFound,

    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Durable user store keyed by identifier and by unique email
///
/// Absence is not an error for lookups and deletes. Uniqueness of email is
/// enforced here, by the storage layer, not by callers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, assigning identifier and timestamps
    ///
    /// Fails with [`RepositoryError::DuplicateKey`] if the email is taken.
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// All users, in storage-defined order
    async fn get_all(&self) -> RepositoryResult<Vec<User>>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Apply a partial update and refresh `updated_at`
    ///
    /// Fails with [`RepositoryError::NotFound`] if no user has this id.
    async fn update(&self, id: &str, changes: UserChanges) -> RepositoryResult<User>;

    /// Remove by id, returning the removed record
    async fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<User>>;

    /// Remove by email, returning the removed record
    async fn delete_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Number of stored users
    async fn count(&self) -> RepositoryResult<usize>;
}
