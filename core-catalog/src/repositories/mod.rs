//! # Repository Pattern Implementation
//!
//! Data access for each catalog table.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository
//! - SQLite implementations use sqlx for async database access
//! - Batch writes run in a single transaction
//! - List queries are windowed with [`PageRequest`]
//!
//! ## Available Repositories
//!
//! - `CourseRepository` - Courses, their paged lists and bookmark flags
//! - `ModuleRepository` - Modules per course, read flags and content

pub mod course;
pub mod module;
pub mod pagination;

pub use course::{CourseRepository, SqliteCourseRepository};
pub use module::{ModuleRepository, SqliteModuleRepository};
pub use pagination::{Page, PageRequest};
