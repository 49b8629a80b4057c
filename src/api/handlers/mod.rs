//! API request handlers

pub mod health;
pub mod page;

use axum::http::Uri;

use crate::error::WikiError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> WikiError {
    WikiError::NotFound(format!("No route for {}", uri.path()))
}
