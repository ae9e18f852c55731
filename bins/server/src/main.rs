//! Paylane API Server
//!
//! Main entry point: serves the HTTP API and runs the webhook outbox workers
//! in the same process until Ctrl-C.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paylane_api::{AppState, create_router};
use paylane_db::connect;
use paylane_shared::AppConfig;
use paylane_webhook::WebhookWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paylane=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    if config.webhook.merchant_url.is_none() {
        warn!("No merchant webhook URL configured, payment events will not be queued");
    }

    // Start outbox workers
    let shutdown = CancellationToken::new();
    let mut workers = Vec::with_capacity(config.webhook.workers);
    for _ in 0..config.webhook.workers {
        let worker = WebhookWorker::from_config(db.clone(), &config.webhook)
            .context("Failed to build webhook client")?;
        workers.push(worker.spawn(shutdown.clone()));
    }
    info!(workers = workers.len(), "Webhook workers started");

    // Create router
    let state = AppState::new(db, config.webhook.merchant_url.clone());
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // Let in-flight deliveries finish
    shutdown.cancel();
    for worker in workers {
        if let Err(e) = worker.await {
            warn!(error = %e, "Webhook worker ended abnormally");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C and tells the workers to stop.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, only an explicit cancel stops the server.
        shutdown.cancelled().await;
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}
