//! API Server Entry Point
//!
//! Uses `anyhow` for startup errors; request-level errors are
//! `kernel::AppError` rendered by each crate.

mod app;
mod config;

use std::net::SocketAddr;

use assistant::{Assistant, OpenAiClient};
use auth::domain::{AuthSessionRepository, AuthStore, PasswordResetRepository};
use auth::{AuthAppState, InMemoryAuthRepository, Mailer, PgAuthRepository};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,assistant=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    match config.database_url.clone() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;
            tracing::info!("Migrations completed");

            serve(PgAuthRepository::new(pool), config).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory");
            serve(InMemoryAuthRepository::new(), config).await
        }
    }
}

async fn serve<R: AuthStore>(repo: R, config: AppConfig) -> anyhow::Result<()> {
    // Errors here should not prevent server startup
    match repo.cleanup_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Auth session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
        }
    }
    match repo.purge_stale(chrono::Utc::now().timestamp_millis()).await {
        Ok(resets) => {
            tracing::info!(resets_deleted = resets, "Password reset cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password reset cleanup failed, continuing anyway");
        }
    }

    let mailer = Mailer::from_config(config.smtp.as_ref())?;
    let auth_state = AuthAppState::new(repo, mailer, config.auth);

    if config.assistant.api_key.is_none() {
        tracing::info!(api_base = %config.assistant.api_base, "LLM_API_KEY not set");
    }
    let llm = OpenAiClient::new(&config.assistant)?;
    let assistant = Assistant::new(llm, config.assistant);

    let router = app::build_router(auth_state, assistant, &config.frontend_origins);

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
