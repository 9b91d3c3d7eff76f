//! # TaskSmash API Server
//!
//! Social to-do service: tasks, threaded comments, follows, a dashboard and
//! password reset by email.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p tasksmash-api
//! ```
//!
//! Without `DATABASE_URL` the server keeps everything in memory. Without
//! Mailgun credentials reset mails are logged instead of sent.

use std::sync::Arc;

use anyhow::Context;
use tasksmash_api::app::{build_router, AppState};
use tasksmash_api::config::Config;
use tasksmash_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tasksmash_shared::mail::{mailgun::MailgunClient, outbox::MailOutbox, LogMailer, MailSender};
use tasksmash_shared::store::{MemoryStore, PgStore, Store};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tasksmash_api=debug,tasksmash_shared=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves when SIGINT or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber reads RUST_LOG / LOG_FORMAT
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("TaskSmash API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;

    let (store, pool) = match &config.database {
        Some(database) => {
            ensure_database_exists(&database.url)
                .await
                .context("Failed to create database")?;

            let pool = create_pool(
                DatabaseConfig::new(database.url.clone()).with_max_connections(database.max_connections),
            )
            .await
            .context("Failed to connect to database")?;

            run_migrations(&pool).await.context("Failed to run migrations")?;

            (Arc::new(PgStore::new(pool.clone())) as Arc<dyn Store>, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            (Arc::new(MemoryStore::new()) as Arc<dyn Store>, None)
        }
    };

    let delivery: Arc<dyn MailSender> = match config.mail.mailgun() {
        Some(mailgun) => {
            tracing::info!(domain = %mailgun.domain, "Mailgun delivery enabled");
            Arc::new(MailgunClient::new(mailgun).context("Failed to build Mailgun client")?)
        }
        None => {
            tracing::warn!("Mailgun not configured, reset mails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let shutdown = CancellationToken::new();
    let (outbox, dispatcher) =
        MailOutbox::spawn(delivery, config.mail.outbox_capacity, shutdown.child_token());

    let bind_address = config.bind_address();
    let state = AppState::new(store, Arc::new(outbox), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the dispatcher; it drains whatever is still queued
    shutdown.cancel();
    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "Mail dispatcher panicked");
    }

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
