//! The local data source consumed by the repository layer.
//!
//! [`LocalDataSource`] is the whole contract the service layer relies on:
//! reads for every catalog view, batch writes for remote payloads, the two
//! user annotations (bookmark, read) and a change feed. Every successful
//! write announces the tables it touched through the [`ChangeTracker`] after
//! the transaction committed.

use crate::changes::{ChangeListener, ChangeTracker, Table};
use crate::error::Result;
use crate::models::{ContentEntity, CourseEntity, CourseQuery, CourseWithModule, ModuleEntity};
use crate::repositories::{
    CourseRepository, ModuleRepository, PageRequest, SqliteCourseRepository,
    SqliteModuleRepository,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

#[async_trait]
pub trait LocalDataSource: Send + Sync {
    /// Subscribe to committed writes on `tables`.
    fn changes(&self, tables: &[Table]) -> ChangeListener;

    async fn count_courses(&self, query: CourseQuery) -> Result<u64>;

    /// Courses of `query` inside the `page` window, in catalog order.
    async fn courses_page(&self, query: CourseQuery, page: PageRequest)
        -> Result<Vec<CourseEntity>>;

    async fn course(&self, course_id: &str) -> Result<Option<CourseEntity>>;

    /// Modules of a course ordered by position. Empty if none are cached.
    async fn modules_by_course(&self, course_id: &str) -> Result<Vec<ModuleEntity>>;

    /// The module with its content, if fetched.
    async fn module_with_content(&self, module_id: &str) -> Result<Option<ModuleEntity>>;

    /// A course and its cached modules; `None` if the course is unknown.
    async fn course_with_modules(&self, course_id: &str) -> Result<Option<CourseWithModule>>;

    async fn insert_courses(&self, courses: &[CourseEntity]) -> Result<u64>;

    async fn insert_modules(&self, modules: &[ModuleEntity]) -> Result<u64>;

    async fn update_content(&self, module_id: &str, content: &ContentEntity) -> Result<()>;

    async fn set_course_bookmark(&self, course_id: &str, bookmarked: bool) -> Result<()>;

    async fn set_read_module(&self, module_id: &str) -> Result<()>;
}

/// SQLite-backed [`LocalDataSource`].
pub struct SqliteLocalDataSource {
    pool: SqlitePool,
    courses: SqliteCourseRepository,
    modules: SqliteModuleRepository,
    tracker: ChangeTracker,
}

impl SqliteLocalDataSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_tracker(pool, ChangeTracker::default())
    }

    pub fn with_tracker(pool: SqlitePool, tracker: ChangeTracker) -> Self {
        Self {
            courses: SqliteCourseRepository::new(pool.clone()),
            modules: SqliteModuleRepository::new(pool.clone()),
            pool,
            tracker,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }
}

#[async_trait]
impl LocalDataSource for SqliteLocalDataSource {
    fn changes(&self, tables: &[Table]) -> ChangeListener {
        self.tracker.subscribe(tables)
    }

    async fn count_courses(&self, query: CourseQuery) -> Result<u64> {
        self.courses.count(query).await
    }

    async fn courses_page(
        &self,
        query: CourseQuery,
        page: PageRequest,
    ) -> Result<Vec<CourseEntity>> {
        Ok(self.courses.query(query, page).await?.items)
    }

    async fn course(&self, course_id: &str) -> Result<Option<CourseEntity>> {
        self.courses.find_by_id(course_id).await
    }

    async fn modules_by_course(&self, course_id: &str) -> Result<Vec<ModuleEntity>> {
        self.modules.find_by_course(course_id).await
    }

    async fn module_with_content(&self, module_id: &str) -> Result<Option<ModuleEntity>> {
        self.modules.find_by_id(module_id).await
    }

    async fn course_with_modules(&self, course_id: &str) -> Result<Option<CourseWithModule>> {
        let Some(course) = self.courses.find_by_id(course_id).await? else {
            return Ok(None);
        };
        let modules = self.modules.find_by_course(course_id).await?;

        Ok(Some(CourseWithModule::new(course, modules)))
    }

    #[instrument(skip(self, courses), fields(count = courses.len()))]
    async fn insert_courses(&self, courses: &[CourseEntity]) -> Result<u64> {
        if courses.is_empty() {
            return Ok(0);
        }

        let written = self.courses.upsert_batch(courses).await?;
        self.tracker.notify(Table::Courses);

        Ok(written)
    }

    #[instrument(skip(self, modules), fields(count = modules.len()))]
    async fn insert_modules(&self, modules: &[ModuleEntity]) -> Result<u64> {
        if modules.is_empty() {
            return Ok(0);
        }

        let written = self.modules.upsert_batch(modules).await?;
        self.tracker.notify(Table::Modules);

        Ok(written)
    }

    async fn update_content(&self, module_id: &str, content: &ContentEntity) -> Result<()> {
        self.modules.update_content(module_id, content).await?;
        self.tracker.notify(Table::Modules);

        Ok(())
    }

    async fn set_course_bookmark(&self, course_id: &str, bookmarked: bool) -> Result<()> {
        self.courses.set_bookmarked(course_id, bookmarked).await?;
        debug!(course_id, bookmarked, "Bookmark stored");
        self.tracker.notify(Table::Courses);

        Ok(())
    }

    async fn set_read_module(&self, module_id: &str) -> Result<()> {
        if self.modules.mark_read(module_id).await? {
            debug!(module_id, "Module marked as read");
            self.tracker.notify(Table::Modules);
        }

        Ok(())
    }
}
