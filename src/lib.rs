//! Wiki Server - realtime collaborative wiki backend
//!
//! Serves page content over HTTP and keeps everyone viewing the same page
//! in sync over WebSocket.
//!
//! ## Features
//!
//! - Page CRUD backed by SQLite
//! - Live viewer counts per page
//! - Edit relay to the other viewers of a page
//! - Self-healing fan-out: peers that fail or stall on a send are dropped

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod hub;
pub mod models;
pub mod repository;

pub use config::Config;
pub use database::Database;
pub use error::{Result, WikiError};
pub use hub::BroadcastHub;
