//! # Academy Repository
//!
//! Single entry point for catalog reads and the two user annotations.
//!
//! Every read returns a [`ResourceStream`] fed by a network-bound resource
//! driver: the local store answers first, the remote catalog refills it when
//! the cached rows are missing, and later local writes are pushed to the
//! observer. Writes go to the local store only and run on the disk pool.

use async_trait::async_trait;
use core_catalog::{
    CourseEntity, CourseQuery, CourseWithModule, LocalDataSource, ModuleEntity,
    Result as CatalogResult, Table,
};
use core_runtime::events::{CatalogEvent, EventBus};
use core_runtime::AppExecutors;
use provider_academy::{
    ContentResponse, CourseResponse, ModuleResponse, RemoteDataSource, Result as RemoteResult,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::bound_resource::{launch, DriverContext, NetworkBoundResource};
use crate::error::Result;
use crate::paging::{PagedSequence, PagedSequenceFactory, PagingConfig};
use crate::stream::ResourceStream;

/// Cache-first access to the course catalog.
#[derive(Clone)]
pub struct AcademyRepository {
    ctx: DriverContext,
    remote: Arc<dyn RemoteDataSource>,
    sequences: PagedSequenceFactory,
}

impl AcademyRepository {
    pub fn new(
        local: Arc<dyn LocalDataSource>,
        remote: Arc<dyn RemoteDataSource>,
        executors: AppExecutors,
        events: EventBus,
        paging: PagingConfig,
    ) -> Self {
        Self {
            sequences: PagedSequenceFactory::new(Arc::clone(&local), paging),
            ctx: DriverContext {
                local,
                executors,
                events,
            },
            remote,
        }
    }

    /// Diagnostic events published by this repository.
    pub fn events(&self) -> &EventBus {
        &self.ctx.events
    }

    pub fn executors(&self) -> &AppExecutors {
        &self.ctx.executors
    }

    /// The whole catalog, refilled when no course is cached.
    pub fn get_all_courses(&self) -> ResourceStream<PagedSequence<CourseEntity>> {
        launch(
            CourseList {
                local: Arc::clone(&self.ctx.local),
                remote: Arc::clone(&self.remote),
                sequences: self.sequences.clone(),
                query: CourseQuery::All,
            },
            &self.ctx,
        )
    }

    /// Bookmarked courses. Refilled only while the catalog is empty.
    pub fn get_bookmarked_courses(&self) -> ResourceStream<PagedSequence<CourseEntity>> {
        launch(
            CourseList {
                local: Arc::clone(&self.ctx.local),
                remote: Arc::clone(&self.remote),
                sequences: self.sequences.clone(),
                query: CourseQuery::Bookmarked,
            },
            &self.ctx,
        )
    }

    /// Modules of a course ordered by position.
    pub fn get_all_modules_by_course(&self, course_id: &str) -> ResourceStream<Vec<ModuleEntity>> {
        launch(
            CourseModules {
                local: Arc::clone(&self.ctx.local),
                remote: Arc::clone(&self.remote),
                course_id: course_id.to_string(),
            },
            &self.ctx,
        )
    }

    /// A course joined with its modules.
    pub fn get_course_with_modules(&self, course_id: &str) -> ResourceStream<CourseWithModule> {
        launch(
            CourseDetail {
                local: Arc::clone(&self.ctx.local),
                remote: Arc::clone(&self.remote),
                course_id: course_id.to_string(),
            },
            &self.ctx,
        )
    }

    /// A module carrying its content.
    pub fn get_content(&self, module_id: &str) -> ResourceStream<ModuleEntity> {
        launch(
            ModuleContent {
                local: Arc::clone(&self.ctx.local),
                remote: Arc::clone(&self.remote),
                module_id: module_id.to_string(),
            },
            &self.ctx,
        )
    }

    /// Set the bookmark flag of `course`. Resolves once the write committed.
    #[instrument(skip(self, course), fields(course_id = %course.id))]
    pub async fn set_course_bookmark(&self, course: &CourseEntity, bookmarked: bool) -> Result<()> {
        let local = Arc::clone(&self.ctx.local);
        let course_id = course.id.clone();

        self.ctx
            .executors
            .run_on_disk(async move { local.set_course_bookmark(&course_id, bookmarked).await })
            .await??;

        info!(bookmarked, "Course bookmark updated");
        self.ctx
            .events
            .emit(CatalogEvent::BookmarkChanged {
                course_id: course.id.clone(),
                bookmarked,
            })
            .ok();

        Ok(())
    }

    /// Mark `module` as read. The update is issued on every call.
    #[instrument(skip(self, module), fields(module_id = %module.id))]
    pub async fn set_read_module(&self, module: &ModuleEntity) -> Result<()> {
        let local = Arc::clone(&self.ctx.local);
        let module_id = module.id.clone();

        self.ctx
            .executors
            .run_on_disk(async move { local.set_read_module(&module_id).await })
            .await??;

        info!("Module marked as read");
        self.ctx
            .events
            .emit(CatalogEvent::ModuleRead {
                module_id: module.id.clone(),
            })
            .ok();

        Ok(())
    }
}

fn into_entities<R, E>(responses: Vec<R>) -> Vec<E>
where
    R: Into<E>,
{
    responses.into_iter().map(Into::into).collect()
}

// =============================================================================
// Resources
// =============================================================================

struct CourseList {
    local: Arc<dyn LocalDataSource>,
    remote: Arc<dyn RemoteDataSource>,
    sequences: PagedSequenceFactory,
    query: CourseQuery,
}

#[async_trait]
impl NetworkBoundResource for CourseList {
    type Data = PagedSequence<CourseEntity>;
    type Remote = Vec<CourseResponse>;

    fn name(&self) -> &'static str {
        match self.query {
            CourseQuery::All => "all_courses",
            CourseQuery::Bookmarked => "bookmarked_courses",
        }
    }

    fn tables(&self) -> &'static [Table] {
        &[Table::Courses]
    }

    async fn load_from_db(&self) -> CatalogResult<Option<Self::Data>> {
        self.sequences.courses(self.query).await.map(Some)
    }

    async fn should_fetch(&self, cached: Option<&Self::Data>) -> CatalogResult<bool> {
        match self.query {
            CourseQuery::All => Ok(cached.map_or(true, PagedSequence::is_empty)),
            CourseQuery::Bookmarked => Ok(self.local.count_courses(CourseQuery::All).await? == 0),
        }
    }

    async fn create_call(&self, _cached: Option<Self::Data>) -> RemoteResult<Self::Remote> {
        self.remote.fetch_all_courses().await
    }

    async fn save_call_result(&self, remote: Self::Remote) -> CatalogResult<u64> {
        let courses: Vec<CourseEntity> = into_entities(remote);
        self.local.insert_courses(&courses).await
    }
}

struct CourseModules {
    local: Arc<dyn LocalDataSource>,
    remote: Arc<dyn RemoteDataSource>,
    course_id: String,
}

#[async_trait]
impl NetworkBoundResource for CourseModules {
    type Data = Vec<ModuleEntity>;
    type Remote = Vec<ModuleResponse>;

    fn name(&self) -> &'static str {
        "course_modules"
    }

    fn key(&self) -> Option<&str> {
        Some(self.course_id.as_str())
    }

    fn tables(&self) -> &'static [Table] {
        &[Table::Modules]
    }

    async fn load_from_db(&self) -> CatalogResult<Option<Self::Data>> {
        self.local.modules_by_course(&self.course_id).await.map(Some)
    }

    async fn should_fetch(&self, cached: Option<&Self::Data>) -> CatalogResult<bool> {
        Ok(cached.map_or(true, Vec::is_empty))
    }

    async fn create_call(&self, _cached: Option<Self::Data>) -> RemoteResult<Self::Remote> {
        self.remote.fetch_modules(&self.course_id).await
    }

    async fn save_call_result(&self, remote: Self::Remote) -> CatalogResult<u64> {
        let modules: Vec<ModuleEntity> = into_entities(remote);
        self.local.insert_modules(&modules).await
    }
}

/// Remote half of a course detail refresh. `courses` is only fetched when
/// the course row itself is missing.
struct CourseDetailPayload {
    courses: Option<Vec<CourseResponse>>,
    modules: Vec<ModuleResponse>,
}

struct CourseDetail {
    local: Arc<dyn LocalDataSource>,
    remote: Arc<dyn RemoteDataSource>,
    course_id: String,
}

#[async_trait]
impl NetworkBoundResource for CourseDetail {
    type Data = CourseWithModule;
    type Remote = CourseDetailPayload;

    fn name(&self) -> &'static str {
        "course"
    }

    fn key(&self) -> Option<&str> {
        Some(self.course_id.as_str())
    }

    fn tables(&self) -> &'static [Table] {
        &[Table::Courses, Table::Modules]
    }

    async fn load_from_db(&self) -> CatalogResult<Option<Self::Data>> {
        self.local.course_with_modules(&self.course_id).await
    }

    async fn should_fetch(&self, cached: Option<&Self::Data>) -> CatalogResult<bool> {
        Ok(cached.map_or(true, |detail| detail.modules.is_empty()))
    }

    async fn create_call(&self, cached: Option<Self::Data>) -> RemoteResult<Self::Remote> {
        let courses = match cached {
            Some(_) => None,
            None => Some(self.remote.fetch_all_courses().await?),
        };
        let modules = self.remote.fetch_modules(&self.course_id).await?;

        Ok(CourseDetailPayload { courses, modules })
    }

    async fn save_call_result(&self, remote: Self::Remote) -> CatalogResult<u64> {
        let mut written = 0;

        if let Some(courses) = remote.courses {
            let courses: Vec<CourseEntity> = into_entities(courses);
            written += self.local.insert_courses(&courses).await?;
        }

        let modules: Vec<ModuleEntity> = into_entities(remote.modules);
        written += self.local.insert_modules(&modules).await?;

        Ok(written)
    }
}

struct ModuleContent {
    local: Arc<dyn LocalDataSource>,
    remote: Arc<dyn RemoteDataSource>,
    module_id: String,
}

#[async_trait]
impl NetworkBoundResource for ModuleContent {
    type Data = ModuleEntity;
    type Remote = ContentResponse;

    fn name(&self) -> &'static str {
        "module"
    }

    fn key(&self) -> Option<&str> {
        Some(self.module_id.as_str())
    }

    fn tables(&self) -> &'static [Table] {
        &[Table::Modules]
    }

    async fn load_from_db(&self) -> CatalogResult<Option<Self::Data>> {
        self.local.module_with_content(&self.module_id).await
    }

    async fn should_fetch(&self, cached: Option<&Self::Data>) -> CatalogResult<bool> {
        Ok(cached.map_or(true, |module| !module.has_content()))
    }

    async fn create_call(&self, _cached: Option<Self::Data>) -> RemoteResult<Self::Remote> {
        self.remote.fetch_content(&self.module_id).await
    }

    async fn save_call_result(&self, remote: Self::Remote) -> CatalogResult<u64> {
        self.local
            .update_content(&self.module_id, &remote.into())
            .await?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::TokioTaskExecutor;
    use core_catalog::{db::create_test_pool, SqliteLocalDataSource};
    use futures::StreamExt;
    use provider_academy::RemoteError;

    struct FixedRemote {
        courses: Vec<CourseResponse>,
    }

    #[async_trait]
    impl RemoteDataSource for FixedRemote {
        async fn fetch_all_courses(&self) -> RemoteResult<Vec<CourseResponse>> {
            Ok(self.courses.clone())
        }

        async fn fetch_modules(&self, course_id: &str) -> RemoteResult<Vec<ModuleResponse>> {
            Err(RemoteError::NotFound(course_id.to_string()))
        }

        async fn fetch_content(&self, module_id: &str) -> RemoteResult<ContentResponse> {
            Err(RemoteError::NotFound(module_id.to_string()))
        }
    }

    fn course_response(id: &str, title: &str) -> CourseResponse {
        CourseResponse {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            date: "100 Hari".to_string(),
            image_path: String::new(),
            total_modules: 0,
        }
    }

    async fn repository(courses: Vec<CourseResponse>) -> AcademyRepository {
        let pool = create_test_pool().await.unwrap();
        let executor = Arc::new(TokioTaskExecutor::unbounded("test").unwrap());

        AcademyRepository::new(
            Arc::new(SqliteLocalDataSource::new(pool)),
            Arc::new(FixedRemote { courses }),
            AppExecutors::single(executor),
            EventBus::default(),
            PagingConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_course_list_generations_increase() {
        let repository = repository(vec![course_response("c1", "Algorithms")]).await;
        let mut stream = repository.get_all_courses();

        let loading = stream.next().await.unwrap();
        let success = stream.next().await.unwrap();

        let first = loading.data().unwrap().generation();
        let second = success.data().unwrap().generation();
        assert!(second > first);
        assert_eq!(success.data().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_module_content_fails() {
        let repository = repository(Vec::new()).await;
        let mut stream = repository.get_content("m404");

        assert!(stream.next().await.unwrap().is_loading());
        let failed = stream.next().await.unwrap();
        assert!(failed.is_error());
        assert!(failed.data().is_none());
    }

    #[tokio::test]
    async fn test_bookmark_unknown_course_is_not_found() {
        let repository = repository(Vec::new()).await;
        let course = CourseEntity::new("ghost", "Ghost", "", "", 0, "");

        let result = repository.set_course_bookmark(&course, true).await;
        assert!(matches!(
            result,
            Err(crate::CoreError::Catalog(
                core_catalog::CatalogError::NotFound { .. }
            ))
        ));
    }
}
