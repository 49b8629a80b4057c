use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the wiki server
#[derive(Error, Debug)]
pub enum WikiError {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database connection failed: {0}")]
    DatabaseConnection(String),

    #[error("Migration {version} ({name}) failed: {reason}")]
    Migration {
        version: i64,
        name: String,
        reason: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for wiki server operations
pub type Result<T> = std::result::Result<T, WikiError>;

impl WikiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            WikiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            WikiError::NotFound(_) => StatusCode::NOT_FOUND,

            // 503 Service Unavailable
            WikiError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            WikiError::Database(_)
            | WikiError::Migration { .. }
            | WikiError::InvalidConfig(_)
            | WikiError::Io(_)
            | WikiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for WikiError {
    fn from(err: serde_json::Error) -> Self {
        WikiError::InvalidRequest(err.to_string())
    }
}
