//! Wiki Server - Entry Point
//!
//! Starts the API server with graceful shutdown support.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wiki_server::api::ApiServer;
use wiki_server::config::{Config, LogConfig};
use wiki_server::database::Database;
use wiki_server::error;
use wiki_server::hub::BroadcastHub;
use wiki_server::repository::{PageRepository, PageStore};

#[tokio::main]
async fn main() -> error::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    init_tracing(&config.log);

    info!("Starting Wiki Server");

    // Open page database
    let db = Database::new(&config).await?;
    info!("Connected to database");

    // Run migrations
    db.run_migrations().await?;
    info!("Database migrations complete");

    let store: Arc<dyn PageStore> = Arc::new(PageRepository::new(db.pool().clone()));
    let hub = Arc::new(BroadcastHub::new(config.hub.clone()));
    info!(
        send_timeout_ms = config.hub.send_timeout.as_millis() as u64,
        presence_on_leave = config.hub.presence_on_leave,
        "Broadcast hub ready"
    );

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let api_server = ApiServer::new(config.clone(), db.clone(), store, hub.clone());

    let api_task = tokio::spawn(async move {
        if let Err(e) = api_server.run(shutdown_rx).await {
            error!("API server error: {}", e);
        }
    });

    info!("Server started - API: {}", config.api_addr());

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);

    // Live sockets keep graceful shutdown waiting, so close them first
    hub.shutdown().await;

    let _ = api_task.await;
    db.close().await;

    info!("Wiki Server stopped");
    Ok(())
}

/// Initialize tracing from the log config; `RUST_LOG` takes precedence
fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("wiki_server={},tower_http=debug", log.level).into()
    });
    let json = log.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
