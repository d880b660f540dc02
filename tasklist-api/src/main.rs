//! # Tasklist API Server
//!
//! Multi-user task-list backend: accounts sign up and sign in, then manage
//! tasks scoped to their own account.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/tasklist \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p tasklist-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use tasklist_api::app::{build_router, AppState};
use tasklist_api::config::{Config, LogFormat};
use tasklist_shared::auth::password::HashParams;
use tasklist_shared::db::migrations::run_migrations;
use tasklist_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use tasklist_shared::notify::{EventPublisher, RedisNotifier};
use tasklist_shared::services::{IdentityConfig, IdentityService, TaskService};
use tasklist_shared::store::{PgAccountStore, PgTaskStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "Tasklist API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to PostgreSQL")?;

    if config.database.run_migrations {
        run_migrations(&pool).await.context("Failed to run migrations")?;
    }

    let notifier = RedisNotifier::connect(config.redis.clone())
        .await
        .context("Failed to connect to Redis")?;
    let events = EventPublisher::new(Arc::new(notifier), config.notify_policy);

    let identity = IdentityService::new(
        Arc::new(PgAccountStore::new(pool.clone())),
        events.clone(),
        IdentityConfig {
            secret: config.jwt.secret.clone(),
            token_ttl: Duration::hours(config.jwt.token_ttl_hours),
            hash_params: HashParams::default(),
        },
    );
    let tasks = TaskService::new(Arc::new(PgTaskStore::new(pool.clone())), events);

    let app = build_router(AppState::new(identity, tasks), &config.api.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    tracing::info!(
        notify_policy = ?config.notify_policy,
        "Server listening on http://{}",
        config.bind_address()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutdown signal received, closing connections...");
    close_pool(pool).await;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tasklist_api=debug,tasklist_shared=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
