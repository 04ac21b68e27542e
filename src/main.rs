//! Server binary: config from env, database bootstrap, router, graceful shutdown.

use cms_backend::{app, auto_migrate, ensure_database_exists, AppConfig, AppState, PgStore};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cms_backend=info,tower_http=info")),
        )
        .init();
    tracing::info!(environment = ?config.environment, "starting");

    if config.environment.auto_migrate() {
        ensure_database_exists(&config.database_url).await?;
    }
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    if config.environment.auto_migrate() {
        tracing::info!("running auto-migrate");
        auto_migrate(&pool).await?;
    }

    let state = AppState::new(PgStore::new(pool.clone()));
    let router = app(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
