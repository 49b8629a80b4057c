use crate::error::{Result, WikiError};
use sqlx::SqlitePool;
use tracing::info;

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Create migrations table if not exists
    create_migrations_table(pool).await?;

    for (version, name, sql) in get_migrations() {
        if !is_migration_applied(pool, version).await? {
            info!(version = version, name = name, "Applying migration");

            sqlx::query(sql)
                .execute(pool)
                .await
                .map_err(|e| WikiError::Migration {
                    version,
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;

            record_migration(pool, version, name).await?;

            info!(version = version, name = name, "Migration applied successfully");
        }
    }

    Ok(())
}

/// Create the migrations tracking table
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Check if a migration has been applied
async fn is_migration_applied(pool: &SqlitePool, version: i64) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schema_migrations WHERE version = ?")
            .bind(version)
            .fetch_one(pool)
            .await?;

    Ok(result > 0)
}

/// Record a migration as applied
async fn record_migration(pool: &SqlitePool, version: i64, name: &str) -> Result<()> {
    sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
        .bind(version)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Get all migrations in order
fn get_migrations() -> Vec<(i64, &'static str, &'static str)> {
    vec![(1, "pages_table", MIGRATION_001_PAGES_TABLE)]
}

// Migration 1: page content keyed by title
const MIGRATION_001_PAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pages (
    title TEXT PRIMARY KEY,
    content BLOB,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;
