use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use msaada_backend::auth::{PasswordHasher, TokenKeys};
use msaada_backend::config;
use msaada_backend::database::DatabaseManager;
use msaada_backend::i18n::Translations;
use msaada_backend::repository::Repositories;
use msaada_backend::services::bootstrap;
use msaada_backend::{app, AppState};

const TRACING_TARGET_SERVER: &str = "msaada_backend::server";

#[derive(Parser)]
#[command(name = "msaada-backend")]
#[command(about = "Users, profiles and products API server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create the database if needed and apply migrations")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL, key material, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Migrate => migrate().await,
    }
}

async fn migrate() -> anyhow::Result<()> {
    let config = config::config();
    let pool = DatabaseManager::new(&config.database)
        .bootstrap()
        .await
        .context("database bootstrap failed")?;
    pool.close().await;

    tracing::info!(target: TRACING_TARGET_SERVER, "migrations applied");
    Ok(())
}

async fn serve() -> anyhow::Result<()> {
    let config = Arc::new(config::config().clone());
    tracing::info!(
        target: TRACING_TARGET_SERVER,
        "Starting msaada-backend in {:?} mode",
        config.environment
    );

    let translations = Translations::load(&config.i18n).context("loading translations")?;
    let keys = TokenKeys::from_config(&config.security).context("loading token keys")?;

    let pool = DatabaseManager::new(&config.database)
        .bootstrap()
        .await
        .context("database bootstrap failed")?;
    let repos = Repositories::postgres(pool.clone());

    let defaults_repos = repos.clone();
    let admin = config.admin.clone();
    tokio::spawn(async move {
        match bootstrap::create_defaults(&defaults_repos, &admin, &PasswordHasher::new()).await {
            Ok(user) => {
                tracing::info!(target: TRACING_TARGET_SERVER, user_id = user.id, "default records ready")
            }
            Err(e) => {
                tracing::error!(target: TRACING_TARGET_SERVER, error = %e, "creating default records failed")
            }
        }
    });

    let state = AppState::new(
        config.clone(),
        Arc::new(translations),
        Arc::new(keys),
        repos,
        Some(pool),
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!(target: TRACING_TARGET_SERVER, "listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
