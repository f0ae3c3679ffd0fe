//! Warden Store - storage backends for user records
//!
//! Two interchangeable [`UserRepository`] implementations:
//! - PostgreSQL via SQLx (relational, numeric ids)
//! - SurrealDB over WebSocket (document store, UUID record keys)
//!
//! Both enforce email uniqueness with a storage-level constraint.

pub mod postgres_store;
pub mod surrealdb_store;

pub use postgres_store::PostgresUserStore;
pub use surrealdb_store::SurrealUserStore;

use std::sync::Arc;
use tracing::info;
use warden_core::{
    DatabaseConfig, InMemoryUserRepository, RepositoryResult, StorageBackend, UserRepository,
};

/// Open the configured backend and make sure its schema exists
pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<Arc<dyn UserRepository>> {
    let repo: Arc<dyn UserRepository> = match config.backend {
        StorageBackend::Postgres => {
            let store = PostgresUserStore::new(config).await?;
            store.init_schema().await?;
            Arc::new(store)
        }
        StorageBackend::SurrealDb => {
            let store = SurrealUserStore::new(config).await?;
            store.init_schema().await?;
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(InMemoryUserRepository::new()),
    };

    info!(backend = %config.backend, "User store ready");
    Ok(repo)
}
