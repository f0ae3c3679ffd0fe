//! PostgreSQL user store
//!
//! Users live in a single `users` table. Ids are `BIGSERIAL` values handed
//! out as decimal strings; an id that does not parse as a number cannot
//! exist and is treated as absent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::info;
use warden_core::{
    DatabaseConfig, NewUser, RepositoryError, RepositoryResult, User, UserChanges, UserRepository,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// PostgreSQL-backed [`UserRepository`]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new connection pool
    pub async fn new(config: &DatabaseConfig) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.postgres_pool_size)
            .connect(&config.postgres_url)
            .await
            .map_err(|e| {
                RepositoryError::Database(format!("PostgreSQL connection failed: {e}"))
            })?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `users` table if it does not exist
    pub async fn init_schema(&self) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT users_email_key UNIQUE (email)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Schema init failed", e))?;

        info!("PostgreSQL users schema ready");
        Ok(())
    }
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn parse_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

fn db_error(context: &str, e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return RepositoryError::DuplicateKey(db.constraint().unwrap_or("email").to_string());
        }
    }
    RepositoryError::Database(format!("{context}: {e}"))
}

#[async_trait]
impl UserRepository for PostgresUserStore {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create user", e))?;

        info!(user_id = row.id, "Created user");
        Ok(row.into())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("Failed to list users", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to get user", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to get user", e))?;

        Ok(row.map(User::from))
    }

    async fn update(&self, id: &str, changes: UserChanges) -> RepositoryResult<User> {
        let id = parse_id(id).ok_or(RepositoryError::NotFound)?;

        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update user", e))?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        info!(user_id = row.id, "Updated user");
        Ok(row.into())
    }

    async fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let row: Option<UserRow> =
            sqlx::query_as(&format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to delete user", e))?;

        if let Some(ref row) = row {
            info!(user_id = row.id, "Deleted user");
        }
        Ok(row.map(User::from))
    }

    async fn delete_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "DELETE FROM users WHERE email = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete user", e))?;

        if let Some(ref row) = row {
            info!(user_id = row.id, "Deleted user");
        }
        Ok(row.map(User::from))
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count users", e))?;

        Ok(count.max(0) as usize)
    }
}
