//! # Course Catalog Store
//!
//! Owns the local course catalog cache and the data-access layer over it.
//!
//! ## Overview
//!
//! This crate manages:
//! - SQLite schema and migrations (`courses`, `modules`)
//! - Entity repositories with paged queries and batch upserts
//! - A change tracker that tells live readers which tables were written
//! - The [`LocalDataSource`] contract consumed by the service layer

pub mod changes;
pub mod db;
pub mod error;
pub mod local;
pub mod models;
pub mod repositories;

pub use changes::{ChangeListener, ChangeTracker, Table};
pub use error::{CatalogError, Result};
pub use local::{LocalDataSource, SqliteLocalDataSource};
pub use models::{ContentEntity, CourseEntity, CourseQuery, CourseWithModule, ModuleEntity};
pub use repositories::{Page, PageRequest};
