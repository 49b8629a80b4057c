//! Page presence WebSocket handler

use std::sync::Arc;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use tracing::debug;

use super::WsTransport;
use crate::api::server::AppState;

/// WebSocket handler for live page presence and edits
pub async fn page_ws(
    ws: WebSocketUpgrade,
    Path(title): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_page_ws(socket, title, state))
}

/// Run one page connection until it leaves the hub
async fn handle_page_ws(socket: WebSocket, title: String, state: AppState) {
    let transport = Arc::new(WsTransport::new(socket));
    let id = state.hub.run_session(transport, title).await;

    debug!(connection_id = %id, "Page WebSocket task finished");
}
