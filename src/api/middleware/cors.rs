//! CORS middleware configuration
//!
//! Uses an explicit origin whitelist; credentials are allowed, so a wildcard
//! origin is never emitted.

use axum::http::header;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::debug;

/// Origins allowed when none are configured
pub const DEFAULT_ORIGINS: &[&str] = &["https://w1ki-demo.vercel.app", "http://localhost:3000"];

/// Create a CORS layer with the specified allowed origins
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed_headers = [
        header::ORIGIN,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::AUTHORIZATION,
    ];

    let origins: Vec<HeaderValue> = if allowed_origins.is_empty() {
        debug!("CORS: No origins specified, allowing defaults: {:?}", DEFAULT_ORIGINS);
        DEFAULT_ORIGINS
            .iter()
            .copied()
            .map(HeaderValue::from_static)
            .collect()
    } else {
        debug!("CORS: Allowing origins: {:?}", allowed_origins);
        allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect()
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(allowed_headers)
        .allow_credentials(true)
}
