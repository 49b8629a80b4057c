//! API server implementation
//!
//! Provides REST endpoints for pages and the WebSocket endpoint for live
//! page presence.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::{ApiServer, AppState};
