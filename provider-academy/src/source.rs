use crate::error::Result;
use crate::types::{ContentResponse, CourseResponse, ModuleResponse};
use async_trait::async_trait;

/// Source of fresh catalog payloads.
///
/// Each call is a single attempt. Callers decide what a failure means for
/// their cached data.
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    /// The complete course catalog, in publication order.
    async fn fetch_all_courses(&self) -> Result<Vec<CourseResponse>>;

    /// Modules of one course. Every entry carries `course_id`.
    async fn fetch_modules(&self, course_id: &str) -> Result<Vec<ModuleResponse>>;

    /// Body of one module. The response carries `module_id`.
    async fn fetch_content(&self, module_id: &str) -> Result<ContentResponse>;
}
