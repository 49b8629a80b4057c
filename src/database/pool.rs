use crate::config::Config;
use crate::error::{Result, WikiError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the page database
    pub async fn new(config: &Config) -> Result<Self> {
        let database_url = config.database_url();

        info!(
            path = %config.database.path,
            max_connections = config.database.max_connections,
            "Opening page database"
        );

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| WikiError::DatabaseConnection(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(30 * 60)) // 30 minutes
            .connect_with(options)
            .await
            .map_err(|e| WikiError::DatabaseConnection(e.to_string()))?;

        info!("Database connection pool established");

        Ok(Database { pool })
    }

    /// Private in-memory database on a single pinned connection
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| WikiError::DatabaseConnection(e.to_string()))?;

        Ok(Database { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database is healthy
    pub async fn health_check(&self) -> Result<Duration> {
        let start = std::time::Instant::now();

        sqlx::query("SELECT 1").execute(&self.pool).await?;

        Ok(start.elapsed())
    }

    /// Get pool statistics
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
        }
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        super::migrations::run_migrations(&self.pool).await?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

/// Pool statistics
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();

        assert!(db.health_check().await.is_ok());
        assert_eq!(db.pool_stats().size, 1);
    }
}
