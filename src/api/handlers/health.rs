//! Health check endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::api::server::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "wiki-server"
        })),
    )
}

/// Uptime, live connection counts and database reachability
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let pool = state.db.pool_stats();
    let (status, latency_ms) = match state.db.health_check().await {
        Ok(latency) => ("healthy", Some(latency.as_secs_f64() * 1000.0)),
        Err(e) => {
            warn!("Database health check failed: {}", e);
            ("degraded", None)
        }
    };

    Json(json!({
        "status": status,
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "connections": state.hub.connection_count(),
        "active_pages": state.hub.registry().active_rooms(),
        "database": {
            "latency_ms": latency_ms,
            "pool_size": pool.size,
            "pool_idle": pool.idle,
        },
    }))
}
