//! Module repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{ContentEntity, ModuleEntity, ModuleRow};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::debug;

/// Module repository interface for data access operations
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Find a module (with its content, if fetched) by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<ModuleEntity>>;

    /// All modules of a course ordered by position
    async fn find_by_course(&self, course_id: &str) -> Result<Vec<ModuleEntity>>;

    /// Insert new modules and refresh title/position of known ones.
    ///
    /// Read flags and previously fetched content of existing rows are kept.
    /// Returns the number of rows written.
    async fn upsert_batch(&self, modules: &[ModuleEntity]) -> Result<u64>;

    /// Store the fetched body of a module.
    ///
    /// # Errors
    /// Returns `NotFound` if the module does not exist.
    async fn update_content(&self, id: &str, content: &ContentEntity) -> Result<()>;

    /// Set the read flag.
    ///
    /// # Returns
    /// - `Ok(true)` if the flag flipped
    /// - `Ok(false)` if the module was already read
    ///
    /// # Errors
    /// Returns `NotFound` if the module does not exist.
    async fn mark_read(&self, id: &str) -> Result<bool>;
}

/// SQLite implementation of ModuleRepository
pub struct SqliteModuleRepository {
    pool: SqlitePool,
}

impl SqliteModuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM modules WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl ModuleRepository for SqliteModuleRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<ModuleEntity>> {
        let row = query_as::<_, ModuleRow>("SELECT * FROM modules WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ModuleEntity::from))
    }

    async fn find_by_course(&self, course_id: &str) -> Result<Vec<ModuleEntity>> {
        let rows = query_as::<_, ModuleRow>(
            "SELECT * FROM modules WHERE course_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ModuleEntity::from).collect())
    }

    async fn upsert_batch(&self, modules: &[ModuleEntity]) -> Result<u64> {
        for module in modules {
            module
                .validate()
                .map_err(|message| CatalogError::InvalidInput {
                    field: "Module".to_string(),
                    message,
                })?;
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for module in modules {
            let result = query(
                r#"
                INSERT INTO modules (id, course_id, title, position, read, content)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    course_id = excluded.course_id,
                    title = excluded.title,
                    position = excluded.position,
                    content = COALESCE(excluded.content, modules.content)
                "#,
            )
            .bind(&module.id)
            .bind(&module.course_id)
            .bind(&module.title)
            .bind(module.position)
            .bind(module.read)
            .bind(module.content.as_ref().map(|c| c.content.as_str()))
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        debug!(written, "Upserted modules");

        Ok(written)
    }

    async fn update_content(&self, id: &str, content: &ContentEntity) -> Result<()> {
        let result = query("UPDATE modules SET content = ? WHERE id = ?")
            .bind(&content.content)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found("Module", id));
        }

        Ok(())
    }

    async fn mark_read(&self, id: &str) -> Result<bool> {
        let result = query("UPDATE modules SET read = 1 WHERE id = ? AND read = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        if self.exists(id).await? {
            Ok(false)
        } else {
            Err(CatalogError::not_found("Module", id))
        }
    }
}
