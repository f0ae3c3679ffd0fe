//! Cold-start seed user

use crate::error::{Result, WardenError};
use crate::password::CredentialHasher;
use crate::repository::{RepositoryError, UserRepository};
use crate::service::blocking;
use crate::user::{User, UserDraft};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Credentials of the user created on an empty store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for SeedUser {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            email: "johndoe@email.com".to_string(),
            password: "helloworld".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already held at least one user
    Skipped,
    Created(User),
}

/// Create the seed user if, and only if, the store is empty
///
/// Running it again once any user exists is a no-op.
pub async fn ensure_seed_user(
    repo: &dyn UserRepository,
    hasher: &CredentialHasher,
    seed: SeedUser,
) -> Result<SeedOutcome> {
    let existing = repo.count().await?;
    if existing > 0 {
        info!(existing, "Store not empty, skipping seed user");
        return Ok(SeedOutcome::Skipped);
    }

    let valid = UserDraft::new(seed.name, seed.email, seed.password)
        .validated()
        .map_err(WardenError::InvalidInput)?;
    let hasher = hasher.clone();
    let new_user = blocking(move || valid.into_new_user(&hasher)).await?;

    // Another instance may seed the same empty store concurrently
    match repo.create(new_user).await {
        Ok(created) => {
            info!(user_id = %created.id, email = %created.email, "Seed user created");
            Ok(SeedOutcome::Created(created))
        }
        Err(RepositoryError::DuplicateKey(detail)) => {
            info!(%detail, "Seed user created concurrently, skipping");
            Ok(SeedOutcome::Skipped)
        }
        Err(e) => Err(e.into()),
    }
}
