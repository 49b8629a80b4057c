use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

/// Keyed blob store for page content
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Stored content for `title`, or `None` if the page does not exist
    async fn get(&self, title: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace the content for `title`
    async fn set(&self, title: &str, content: &[u8]) -> Result<()>;

    /// Remove `title`; removing a missing page is not an error
    async fn delete(&self, title: &str) -> Result<()>;

    /// All stored page titles
    async fn list(&self) -> Result<Vec<String>>;
}

/// Repository for page database operations
#[derive(Clone)]
pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageStore for PageRepository {
    async fn get(&self, title: &str) -> Result<Option<Vec<u8>>> {
        let content = sqlx::query_scalar::<_, Option<Vec<u8>>>(
            "SELECT content FROM pages WHERE title = ?",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        // A row with NULL content still counts as an existing, empty page
        Ok(content.map(|c| c.unwrap_or_default()))
    }

    async fn set(&self, title: &str, content: &[u8]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pages (title, content, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(title) DO UPDATE SET content = excluded.content, updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(title)
        .bind(content)
        .execute(&self.pool)
        .await?;

        debug!(title = title, bytes = content.len(), "Saved page");
        Ok(())
    }

    async fn delete(&self, title: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM pages WHERE title = ?")
            .bind(title)
            .execute(&self.pool)
            .await?;

        debug!(title = title, deleted = result.rows_affected(), "Deleted page");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let titles = sqlx::query_scalar::<_, String>("SELECT title FROM pages ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        Ok(titles)
    }
}
