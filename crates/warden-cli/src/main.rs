//! Warden CLI - operator commands against the configured user store
//!
//! Usage:
//!   warden seed
//!   warden users list
//!   warden users remove <id>
//!   warden signin <email> <password>
//!   warden verify <token>
//!   warden config

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use warden_core::{
    ensure_seed_user, AppConfig, AuthService, SeedOutcome, TokenIssuer, UserService,
};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "User store and token administration")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables still take precedence
    #[arg(short, long, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the seed user if the store is empty
    Seed,
    /// Inspect or modify stored users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Check credentials and print a signed token
    Signin { email: String, password: String },
    /// Decode and validate a token
    Verify { token: String },
    /// Print the effective configuration (secrets redacted)
    Config,
}

#[derive(Subcommand)]
enum UsersAction {
    /// List all users
    List,
    /// Delete a user by id
    Remove { id: String },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    config.validate()?;
    tracing::debug!(backend = %config.database.backend, "Configuration loaded");
    if config.auth.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, tokens use the built-in development secret");
    }
    Ok(config)
}

async fn user_service(config: &AppConfig) -> anyhow::Result<UserService> {
    let repo = warden_store::connect(&config.database)
        .await
        .context("Failed to open user store")?;
    tracing::debug!(backend = %config.database.backend, "User store opened");
    Ok(UserService::new(repo, config.auth.hasher()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Seed => {
            let users = user_service(&config).await?;
            let outcome = ensure_seed_user(
                users.repository().as_ref(),
                users.hasher(),
                config.seed.user.clone(),
            )
            .await?;
            match outcome {
                SeedOutcome::Created(user) => {
                    println!("Created seed user {} ({})", user.email, user.id)
                }
                SeedOutcome::Skipped => println!("Store is not empty, nothing to do"),
            }
        }
        Commands::Users { action } => {
            let users = user_service(&config).await?;
            match action {
                UsersAction::List => print_json(&users.list().await?)?,
                UsersAction::Remove { id } => {
                    let removed = users.remove(&id).await?;
                    println!("Deleted user {} ({})", removed.email, removed.id);
                }
            }
        }
        Commands::Signin { email, password } => {
            let users = user_service(&config).await?;
            let auth = AuthService::new(users, TokenIssuer::new(config.auth.token_config()));
            print_json(&auth.sign_in(&email, &password).await?)?;
        }
        Commands::Verify { token } => {
            // Verification needs only the signing key, not the store
            let issuer = TokenIssuer::new(config.auth.token_config());
            let claims = issuer
                .verify(&token)
                .map_err(|e| anyhow::anyhow!("Token rejected: {e}"))?;
            print_json(&claims)?;
        }
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}
