//! Application state management

use std::sync::Arc;
use std::time::Instant;
use warden_core::{
    AppConfig, AuthService, InMemoryUserRepository, PasswordConfig, TokenIssuer, UserRepository,
    UserService,
};

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    pub users: UserService,
    pub auth: AuthService,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Wire the services over the given repository
    pub fn new(config: AppConfig, repo: Arc<dyn UserRepository>) -> Self {
        let users = UserService::new(repo, config.auth.hasher());
        let auth = AuthService::new(users.clone(), TokenIssuer::new(config.auth.token_config()));

        Self {
            config,
            users,
            auth,
            start_time: Instant::now(),
        }
    }

    /// In-memory store and cheap hashing parameters
    pub fn for_testing() -> Self {
        let mut config = AppConfig::default();
        config.auth.password = PasswordConfig::light();
        Self::new(config, Arc::new(InMemoryUserRepository::new()))
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
