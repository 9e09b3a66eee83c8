//! Course repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{CourseEntity, CourseQuery};
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::debug;

/// Course repository interface for data access operations
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Find a course by its ID
    ///
    /// # Returns
    /// - `Ok(Some(course))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: &str) -> Result<Option<CourseEntity>>;

    /// One window of `course_query`, in catalog order
    async fn query(&self, course_query: CourseQuery, page: PageRequest)
        -> Result<Page<CourseEntity>>;

    /// Count rows matching `course_query`
    async fn count(&self, course_query: CourseQuery) -> Result<u64>;

    /// Insert new courses and refresh descriptive fields of known ones.
    ///
    /// Bookmark flags of existing rows are kept. Returns the number of rows
    /// written.
    ///
    /// # Errors
    /// Fails without writing anything if any course is invalid.
    async fn upsert_batch(&self, courses: &[CourseEntity]) -> Result<u64>;

    /// Set the bookmark flag.
    ///
    /// # Errors
    /// Returns `NotFound` if the course does not exist.
    async fn set_bookmarked(&self, id: &str, bookmarked: bool) -> Result<()>;
}

/// SQLite implementation of CourseRepository
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<CourseEntity>> {
        let course = query_as::<_, CourseEntity>("SELECT * FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(course)
    }

    async fn query(
        &self,
        course_query: CourseQuery,
        page: PageRequest,
    ) -> Result<Page<CourseEntity>> {
        let total = self.count(course_query).await?;

        // rowid keeps the order in which the catalog delivered the courses
        let sql = format!(
            "SELECT * FROM courses {} ORDER BY rowid ASC LIMIT ? OFFSET ?",
            course_query.where_clause()
        );
        let courses = query_as::<_, CourseEntity>(&sql)
            .bind(page.sql_limit())
            .bind(page.sql_offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(courses, total, page))
    }

    async fn count(&self, course_query: CourseQuery) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM courses {}",
            course_query.where_clause()
        );
        let (count,): (i64,) = query_as(&sql).fetch_one(&self.pool).await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn upsert_batch(&self, courses: &[CourseEntity]) -> Result<u64> {
        for course in courses {
            course
                .validate()
                .map_err(|message| CatalogError::InvalidInput {
                    field: "Course".to_string(),
                    message,
                })?;
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for course in courses {
            let result = query(
                r#"
                INSERT INTO courses (
                    id, title, description, deadline, module_count, image_path, bookmarked
                )
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    deadline = excluded.deadline,
                    module_count = excluded.module_count,
                    image_path = excluded.image_path
                "#,
            )
            .bind(&course.id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(&course.deadline)
            .bind(course.module_count)
            .bind(&course.image_path)
            .bind(course.bookmarked)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        debug!(written, "Upserted courses");

        Ok(written)
    }

    async fn set_bookmarked(&self, id: &str, bookmarked: bool) -> Result<()> {
        let result = query("UPDATE courses SET bookmarked = ? WHERE id = ?")
            .bind(bookmarked)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::not_found("Course", id));
        }

        Ok(())
    }
}
