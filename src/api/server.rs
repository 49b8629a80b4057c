//! API server using Axum
//!
//! Serves page CRUD over HTTP and live page presence over WebSocket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::{ApiServerConfig, Config};
use crate::database::Database;
use crate::error::{Result, WikiError};
use crate::hub::BroadcastHub;
use crate::repository::PageStore;

use super::middleware::cors_layer;
use super::routes;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub started_at: Instant,
    pub store: Arc<dyn PageStore>,
    pub hub: Arc<BroadcastHub>,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        full_config: Config,
        db: Database,
        store: Arc<dyn PageStore>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        let state = AppState {
            db,
            config: full_config.clone(),
            started_at: Instant::now(),
            store,
            hub,
        };

        Self {
            config: full_config.api,
            state,
        }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        let cors = cors_layer(&self.config.cors_origins);

        routes::create_router(self.state.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout,
            )))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = self.state.config.api_addr().parse().map_err(|_| {
            WikiError::InvalidConfig(format!(
                "Invalid API server address: {}",
                self.state.config.api_addr()
            ))
        })?;

        let router = self.build_router();

        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| WikiError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }
}
