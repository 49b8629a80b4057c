use crate::error::{Result, WikiError};
use std::env;
use std::time::Duration;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP/WebSocket server configuration
    pub api: ApiServerConfig,
    /// Page database configuration
    pub database: DatabaseConfig,
    /// Live connection hub configuration
    pub hub: HubConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port for the API server (default: 8080)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Allowed CORS origins (comma-separated, empty = built-in defaults)
    pub cors_origins: Vec<String>,
    /// Per-request timeout for plain HTTP routes, in seconds
    pub request_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite file holding page content
    pub path: String,
    /// Maximum connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Upper bound on a single frame send to one peer
    pub send_timeout: Duration,
    /// Push a fresh presence count to the room when a viewer leaves
    pub presence_on_leave: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_millis(5000),
            presence_on_leave: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api: ApiServerConfig {
                port: get_env_or("API_PORT", "8080").parse().map_err(|_| {
                    WikiError::InvalidConfig("API_PORT must be a valid port number".into())
                })?,
                host: get_env_or("API_HOST", "0.0.0.0"),
                cors_origins: parse_cors_origins(&get_env_or("CORS_ORIGINS", ""))?,
                request_timeout: get_env_or("API_REQUEST_TIMEOUT", "30")
                    .parse()
                    .unwrap_or(30),
            },
            database: DatabaseConfig {
                path: get_env_or("DATABASE_PATH", "./wiki.db"),
                max_connections: get_env_or("DB_MAX_CONNECTIONS", "5")
                    .parse()
                    .map_err(|_| {
                        WikiError::InvalidConfig("DB_MAX_CONNECTIONS must be a valid number".into())
                    })?,
            },
            hub: HubConfig {
                send_timeout: parse_send_timeout(&get_env_or("HUB_SEND_TIMEOUT_MS", "5000"))?,
                presence_on_leave: get_env_or("HUB_PRESENCE_ON_LEAVE", "false")
                    .parse()
                    .unwrap_or(false),
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        })
    }

    /// Get the database connection URL
    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.database.path)
    }

    /// Get the API server address
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_cors_origins(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|origin| {
            let url = Url::parse(origin).map_err(|e| {
                WikiError::InvalidConfig(format!("CORS origin '{}' is not a valid URL: {}", origin, e))
            })?;
            if url.host_str().is_none() {
                return Err(WikiError::InvalidConfig(format!(
                    "CORS origin '{}' must include a host",
                    origin
                )));
            }
            // Origin headers never carry a trailing slash
            Ok(origin.trim_end_matches('/').to_string())
        })
        .collect()
}

fn parse_send_timeout(raw: &str) -> Result<Duration> {
    let millis: u64 = raw.trim().parse().map_err(|_| {
        WikiError::InvalidConfig("HUB_SEND_TIMEOUT_MS must be a number of milliseconds".into())
    })?;
    // A zero budget fails every send that is not ready on first poll
    if millis == 0 {
        return Err(WikiError::InvalidConfig(
            "HUB_SEND_TIMEOUT_MS must be greater than zero".into(),
        ));
    }
    Ok(Duration::from_millis(millis))
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
