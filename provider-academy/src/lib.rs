//! # Academy Catalog Provider
//!
//! Remote side of the course catalog.
//!
//! ## Overview
//!
//! This crate provides:
//! - Transfer objects for course, module and content payloads
//! - The [`RemoteDataSource`] contract used to refill the local cache
//! - An HTTP source talking to the catalog service through a bridge
//!   `HttpClient`
//! - A JSON asset source reading bundled payload files after a simulated
//!   network delay

pub mod assets;
pub mod error;
pub mod http;
pub mod source;
pub mod types;

pub use assets::JsonAssetRemoteDataSource;
pub use error::{RemoteError, Result};
pub use http::HttpRemoteDataSource;
pub use source::RemoteDataSource;
pub use types::{ContentResponse, CourseResponse, ModuleResponse};
