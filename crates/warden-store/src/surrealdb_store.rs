//! SurrealDB user store
//!
//! Users are records in the `users` table keyed by a UUID v4. The key is
//! also stored in the `uid` field so records map back to [`User`] without
//! parsing record ids. A UNIQUE index on `email` guards registration races.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::info;
use uuid::Uuid;
use warden_core::{
    DatabaseConfig, NewUser, RepositoryError, RepositoryResult, User, UserChanges, UserRepository,
};

const TABLE: &str = "users";

/// SurrealDB-backed [`UserRepository`]
pub struct SurrealUserStore {
    client: Surreal<Client>,
}

impl SurrealUserStore {
    /// Create a new SurrealDB connection
    pub async fn new(config: &DatabaseConfig) -> RepositoryResult<Self> {
        // The ws engine adds the scheme itself
        let url = config
            .surrealdb_url
            .strip_prefix("ws://")
            .or_else(|| config.surrealdb_url.strip_prefix("wss://"))
            .unwrap_or(&config.surrealdb_url);

        let client = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| RepositoryError::Database(format!("SurrealDB connection failed: {e}")))?;

        client
            .signin(Root {
                username: &config.surrealdb_user,
                password: &config.surrealdb_pass,
            })
            .await
            .map_err(|e| RepositoryError::Database(format!("SurrealDB auth failed: {e}")))?;

        client
            .use_ns(&config.surrealdb_namespace)
            .use_db(&config.surrealdb_database)
            .await
            .map_err(|e| RepositoryError::Database(format!("SurrealDB namespace error: {e}")))?;

        Ok(Self { client })
    }

    /// Define the table, its fields and the unique email index
    pub async fn init_schema(&self) -> RepositoryResult<()> {
        self.client
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS users SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS uid ON users TYPE string;
                DEFINE FIELD IF NOT EXISTS name ON users TYPE string;
                DEFINE FIELD IF NOT EXISTS email ON users TYPE string;
                DEFINE FIELD IF NOT EXISTS password_hash ON users TYPE string;
                DEFINE FIELD IF NOT EXISTS created_at ON users TYPE datetime DEFAULT time::now() READONLY;
                DEFINE FIELD IF NOT EXISTS updated_at ON users TYPE datetime VALUE time::now();
                DEFINE INDEX IF NOT EXISTS users_email_unique ON users FIELDS email UNIQUE;
            "#,
            )
            .await
            .and_then(|response| response.check())
            .map_err(|e| RepositoryError::Database(format!("Schema init failed: {e}")))?;

        info!("SurrealDB users schema ready");
        Ok(())
    }
}

/// Insert payload; timestamps are filled in by the schema
#[derive(Debug, Clone, Serialize)]
struct NewUserRecord {
    uid: String,
    name: String,
    email: String,
    password_hash: String,
}

/// User record as stored
#[derive(Debug, Clone, Deserialize)]
struct UserRecord {
    uid: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.uid,
            name: record.name,
            email: record.email,
            password_hash: record.password_hash,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Fields to merge into an existing record
#[derive(Debug, Clone, Serialize)]
struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
}

impl From<UserChanges> for UserPatch {
    fn from(changes: UserChanges) -> Self {
        Self {
            name: changes.name,
            email: changes.email,
            password_hash: changes.password_hash,
        }
    }
}

fn db_error(context: &str, e: surrealdb::Error) -> RepositoryError {
    let message = e.to_string();
    if message.contains("already contains") {
        return RepositoryError::DuplicateKey(message);
    }
    RepositoryError::Database(format!("{context}: {message}"))
}

#[async_trait]
impl UserRepository for SurrealUserStore {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let uid = Uuid::new_v4().to_string();
        let record = NewUserRecord {
            uid: uid.clone(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };

        let created: Option<UserRecord> = self
            .client
            .create((TABLE, uid))
            .content(record)
            .await
            .map_err(|e| db_error("Failed to create user", e))?;

        let created = created.ok_or_else(|| {
            RepositoryError::Database("Create returned no record".to_string())
        })?;

        info!(user_id = %created.uid, email = %created.email, "Created user");
        Ok(created.into())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        let records: Vec<UserRecord> = self
            .client
            .query("SELECT * FROM users ORDER BY created_at ASC")
            .await
            .map_err(|e| db_error("Query failed", e))?
            .take(0)
            .map_err(|e| db_error("Result extraction failed", e))?;

        Ok(records.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        let record: Option<UserRecord> = self
            .client
            .select((TABLE, id))
            .await
            .map_err(|e| db_error("Failed to get user", e))?;

        Ok(record.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let records: Vec<UserRecord> = self
            .client
            .query("SELECT * FROM users WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await
            .map_err(|e| db_error("Query failed", e))?
            .take(0)
            .map_err(|e| db_error("Result extraction failed", e))?;

        Ok(records.into_iter().next().map(User::from))
    }

    async fn update(&self, id: &str, changes: UserChanges) -> RepositoryResult<User> {
        // The WHERE clause stops UPDATE from creating a missing record
        let records: Vec<UserRecord> = self
            .client
            .query("UPDATE type::thing($tb, $uid) MERGE $patch WHERE uid = $uid RETURN AFTER")
            .bind(("tb", TABLE))
            .bind(("uid", id.to_string()))
            .bind(("patch", UserPatch::from(changes)))
            .await
            .map_err(|e| db_error("Query failed", e))?
            .take(0)
            .map_err(|e| db_error("Failed to update user", e))?;

        let updated = records
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)?;

        info!(user_id = %updated.uid, "Updated user");
        Ok(updated.into())
    }

    async fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        let removed: Option<UserRecord> = self
            .client
            .delete((TABLE, id))
            .await
            .map_err(|e| db_error("Failed to delete user", e))?;

        if let Some(ref record) = removed {
            info!(user_id = %record.uid, "Deleted user");
        }
        Ok(removed.map(User::from))
    }

    async fn delete_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let removed: Vec<UserRecord> = self
            .client
            .query("DELETE users WHERE email = $email RETURN BEFORE")
            .bind(("email", email.to_string()))
            .await
            .map_err(|e| db_error("Query failed", e))?
            .take(0)
            .map_err(|e| db_error("Failed to delete user", e))?;

        let removed = removed.into_iter().next();
        if let Some(ref record) = removed {
            info!(user_id = %record.uid, "Deleted user");
        }
        Ok(removed.map(User::from))
    }

    async fn count(&self) -> RepositoryResult<usize> {
        #[derive(Deserialize)]
        struct CountRow {
            count: usize,
        }

        let rows: Vec<CountRow> = self
            .client
            .query("SELECT count() FROM users GROUP ALL")
            .await
            .map_err(|e| db_error("Query failed", e))?
            .take(0)
            .map_err(|e| db_error("Result extraction failed", e))?;

        Ok(rows.first().map(|row| row.count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = UserPatch::from(UserChanges {
            name: Some("Annie".to_string()),
            ..Default::default()
        });

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Annie" }));
    }

    #[test]
    fn test_record_into_user() {
        let now = Utc::now();
        let user = User::from(UserRecord {
            uid: "9f0c".to_string(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            created_at: now,
            updated_at: now,
        });

        assert_eq!(user.id, "9f0c");
        assert_eq!(user.name, "Ann");
    }
}
