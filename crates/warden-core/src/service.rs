//! User service
//!
//! Orchestrates validation, the duplicate-email check, hashing and the
//! repository for registration, listing, profile updates and removal.
//! Also checks credentials on behalf of [`crate::AuthService`].

use crate::error::{Result, WardenError};
use crate::password::{CredentialHasher, PasswordError};
use crate::repository::UserRepository;
use crate::user::{UserDraft, UserProfile};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run a CPU-bound hashing step off the async executor
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WardenError::Internal(e.to_string()))?
        .map_err(WardenError::from)
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: CredentialHasher) -> Self {
        Self { repo, hasher }
    }

    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.repo
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    /// Validate, reject a taken email, hash and persist a new user
    ///
    /// Every failing field is reported in one [`WardenError::InvalidInput`].
    /// The email pre-check gives the common case a clean signal; a
    /// concurrent registration that slips past it is still rejected by the
    /// repository's uniqueness constraint.
    pub async fn register(&self, draft: UserDraft) -> Result<UserProfile> {
        debug!(?draft, "Registering user");

        let valid = draft.validated().map_err(WardenError::InvalidInput)?;

        if self.repo.find_by_email(valid.email()).await?.is_some() {
            warn!(email = %valid.email(), "Registration rejected: email already registered");
            return Err(WardenError::DuplicateEmail);
        }

        let hasher = self.hasher.clone();
        let new_user = blocking(move || valid.into_new_user(&hasher)).await?;
        let created = self.repo.create(new_user).await?;

        info!(user_id = %created.id, "User registered");
        Ok(created.into())
    }

    /// All users, without password hashes
    pub async fn list(&self) -> Result<Vec<UserProfile>> {
        let users = self.repo.get_all().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Replace a user's name, email and password
    ///
    /// All three fields are re-validated and the password is always
    /// re-hashed, so callers must resupply the plaintext password on every
    /// update. Passing back a stored hash would store a hash of that hash.
    pub async fn update_profile(&self, id: &str, draft: UserDraft) -> Result<UserProfile> {
        debug!(user_id = %id, ?draft, "Updating user");

        let valid = draft.validated().map_err(WardenError::InvalidInput)?;

        let hasher = self.hasher.clone();
        let changes = blocking(move || valid.into_changes(&hasher)).await?;
        let updated = self.repo.update(id, changes).await?;

        info!(user_id = %updated.id, "User updated");
        Ok(updated.into())
    }

    /// Delete a user by id, returning the removed record
    pub async fn remove(&self, id: &str) -> Result<UserProfile> {
        match self.repo.delete_by_id(id).await? {
            Some(removed) => {
                info!(user_id = %removed.id, "User removed");
                Ok(removed.into())
            }
            None => {
                warn!(user_id = %id, "Deletion failed: no such user");
                Err(WardenError::DeletionFailed)
            }
        }
    }

    /// Check an email/password pair
    ///
    /// An unknown email and a wrong password produce the same
    /// [`WardenError::InvalidCredentials`].
    pub async fn check_credentials(&self, email: &str, password: &str) -> Result<UserProfile> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            debug!("Credential check failed: unknown email");
            return Err(WardenError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = blocking(move || hasher.verify(&password, &hash)).await?;

        if !matches {
            debug!(user_id = %user.id, "Credential check failed: wrong password");
            return Err(WardenError::InvalidCredentials);
        }

        Ok(user.into())
    }
}
