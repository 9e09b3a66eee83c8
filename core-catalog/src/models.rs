//! Catalog entities
//!
//! Rows of the local cache and the read-only joins assembled from them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Entities
// =============================================================================

/// A course as cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CourseEntity {
    /// Catalog identifier (unique)
    pub id: String,
    pub title: String,
    pub description: String,
    /// Deadline as published by the catalog (e.g. "100 Hari")
    pub deadline: String,
    /// Number of modules the catalog advertises for this course
    pub module_count: i32,
    pub image_path: String,
    /// Local-only flag, written through the repository
    pub bookmarked: bool,
}

impl CourseEntity {
    /// Create an unbookmarked course.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: impl Into<String>,
        module_count: i32,
        image_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            deadline: deadline.into(),
            module_count,
            image_path: image_path.into(),
            bookmarked: false,
        }
    }

    /// Only the id is required; descriptive fields are stored as published.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Course id cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Module body, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntity {
    pub content: String,
}

impl ContentEntity {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A module of a course. `content` stays `None` until it has been fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntity {
    pub id: String,
    pub course_id: String,
    pub title: String,
    /// Sequence order within the course
    pub position: i32,
    /// Local-only flag, written through the repository
    pub read: bool,
    pub content: Option<ContentEntity>,
}

impl ModuleEntity {
    /// Create an unread module without content.
    pub fn new(
        id: impl Into<String>,
        course_id: impl Into<String>,
        title: impl Into<String>,
        position: i32,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            title: title.into(),
            position,
            read: false,
            content: None,
        }
    }

    pub fn with_content(mut self, content: ContentEntity) -> Self {
        self.content = Some(content);
        self
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Module id cannot be empty".to_string());
        }

        if self.course_id.trim().is_empty() {
            return Err(format!("Module {} has no course", self.id));
        }

        Ok(())
    }
}

/// Flat `modules` row; the content column is folded into [`ContentEntity`].
#[derive(Debug, FromRow)]
pub(crate) struct ModuleRow {
    id: String,
    course_id: String,
    title: String,
    position: i32,
    read: bool,
    content: Option<String>,
}

impl From<ModuleRow> for ModuleEntity {
    fn from(row: ModuleRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            position: row.position,
            read: row.read,
            content: row.content.map(ContentEntity::new),
        }
    }
}

// =============================================================================
// Read models
// =============================================================================

/// One course joined with its modules, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseWithModule {
    pub course: CourseEntity,
    pub modules: Vec<ModuleEntity>,
}

impl CourseWithModule {
    pub fn new(course: CourseEntity, mut modules: Vec<ModuleEntity>) -> Self {
        modules.sort_by_key(|module| module.position);
        Self { course, modules }
    }

    pub fn read_count(&self) -> usize {
        self.modules.iter().filter(|module| module.read).count()
    }
}

/// Which slice of the course table a list reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseQuery {
    All,
    Bookmarked,
}

impl CourseQuery {
    pub(crate) fn where_clause(self) -> &'static str {
        match self {
            CourseQuery::All => "",
            CourseQuery::Bookmarked => "WHERE bookmarked = 1",
        }
    }
}
