//! Warden API Server
//!
//! Configuration comes from the environment, optionally layered over the
//! TOML file named by `WARDEN_CONFIG`.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use warden_api::{create_router, state::AppState};
use warden_core::{ensure_seed_user, AppConfig, LoggingConfig, SeedOutcome};

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("WARDEN_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warden_api={level},warden_core={level},warden_store={level},audit=info,tower_http=info",
            level = logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(logging.include_location)
                    .with_line_number(logging.include_location),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_file(logging.include_location)
                    .with_line_number(logging.include_location),
            )
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    if config.auth.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the built-in development secret");
    }

    let repo = warden_store::connect(&config.database)
        .await
        .context("Failed to open user store")?;

    if config.seed.enabled {
        let hasher = config.auth.hasher();
        match ensure_seed_user(repo.as_ref(), &hasher, config.seed.user.clone()).await? {
            SeedOutcome::Created(user) => {
                tracing::info!(email = %user.email, "Seeded initial user")
            }
            SeedOutcome::Skipped => {}
        }
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, repo));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Warden API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
