//! In-memory user store for development and tests

use crate::repository::{RepositoryError, RepositoryResult, UserRepository};
use crate::user::{NewUser, User, UserChanges};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    next_id: u64,
}

/// List-backed [`UserRepository`]
///
/// Keeps insertion order and assigns increasing numeric ids. Email
/// uniqueness is checked under the same write lock as the insert, so two
/// concurrent registrations cannot both succeed.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::DuplicateKey(user.email));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let created = User {
            id: inner.next_id.to_string(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(created.clone());

        tracing::info!(user_id = %created.id, email = %created.email, "Created user");
        Ok(created)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.clone())
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: &str, changes: UserChanges) -> RepositoryResult<User> {
        let mut inner = self.inner.write().await;

        if let Some(ref email) = changes.email {
            if inner.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(RepositoryError::DuplicateKey(email.clone()));
            }
        }

        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user.clone())
    }

    async fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        let mut inner = self.inner.write().await;

        match inner.users.iter().position(|u| u.id == id) {
            Some(index) => {
                let removed = inner.users.remove(index);
                tracing::info!(user_id = %removed.id, "Deleted user");
                Ok(Some(removed))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let mut inner = self.inner.write().await;

        match inner.users.iter().position(|u| u.email == email) {
            Some(index) => {
                let removed = inner.users.remove(index);
                tracing::info!(user_id = %removed.id, "Deleted user");
                Ok(Some(removed))
            }
            None => Ok(None),
        }
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let inner = self.inner.read().await;
        Ok(inner.users.len())
    }
}
