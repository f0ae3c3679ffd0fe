//! Warden Core - user records, credentials and signed tokens
//!
//! This crate holds everything about the credential/token lifecycle that
//! does not depend on a transport or a database driver:
//! - User entity and field validation
//! - Credential hashing (Argon2id)
//! - Signed token issuance and verification (HS256 JWT)
//! - The `UserRepository` contract and an in-memory implementation
//! - User and authentication services
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod memory;
pub mod password;
pub mod repository;
pub mod seed;
pub mod service;
pub mod token;
pub mod user;

pub use auth::{AuthService, IssuedToken};
pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, SeedConfig, ServerConfig,
    StorageBackend,
};
pub use error::{Result, WardenError};
pub use memory::InMemoryUserRepository;
pub use password::{CredentialHasher, PasswordConfig, PasswordError};
pub use repository::{RepositoryError, RepositoryResult, UserRepository};
pub use seed::{ensure_seed_user, SeedOutcome, SeedUser};
pub use service::UserService;
pub use token::{Claims, TokenConfig, TokenError, TokenIssuer};
pub use user::{
    Field, FieldErrors, NewUser, User, UserChanges, UserDraft, UserProfile, ValidatedUser,
    ValidationOutcome,
};
