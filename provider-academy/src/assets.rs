//! Bundled catalog payloads
//!
//! Serves the catalog from JSON files in one directory:
//!
//! - `courses.json`: `{"courses": [...]}`
//! - `module_<course_id>.json`: `{"modules": [...]}`
//! - `content_<module_id>.json`: `{"content": "..."}`
//!
//! Every read waits for a fixed latency first, so offline builds and demos
//! exercise the same loading states as the networked catalog.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{RemoteError, Result};
use crate::source::RemoteDataSource;
use crate::types::{
    ContentResponse, CourseListResponse, CourseResponse, ModuleListResponse, ModuleResponse,
};

/// Delay before each read unless configured otherwise
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

/// [`RemoteDataSource`] backed by JSON files
#[derive(Debug, Clone)]
pub struct JsonAssetRemoteDataSource {
    directory: PathBuf,
    latency: Duration,
}

impl JsonAssetRemoteDataSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            latency: DEFAULT_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    #[instrument(skip(self))]
    async fn load<T: DeserializeOwned>(&self, file_name: &str) -> Result<T> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let path = self.directory.join(file_name);
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RemoteError::NotFound(file_name.to_string()),
            _ => RemoteError::Io(e),
        })?;

        debug!(path = %path.display(), bytes = bytes.len(), "Loaded catalog asset");
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Ids become part of a file name; anything that could leave the directory
/// is rejected.
fn asset_key(id: &str) -> Result<&str> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !id.contains("..");

    if valid {
        Ok(id)
    } else {
        Err(RemoteError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl RemoteDataSource for JsonAssetRemoteDataSource {
    async fn fetch_all_courses(&self) -> Result<Vec<CourseResponse>> {
        let list: CourseListResponse = self.load("courses.json").await?;
        Ok(list.courses)
    }

    async fn fetch_modules(&self, course_id: &str) -> Result<Vec<ModuleResponse>> {
        let file_name = format!("module_{}.json", asset_key(course_id)?);
        let list: ModuleListResponse = self.load(&file_name).await?;

        Ok(list
            .modules
            .into_iter()
            .map(|module| module.for_course(course_id))
            .collect())
    }

    async fn fetch_content(&self, module_id: &str) -> Result<ContentResponse> {
        let file_name = format!("content_{}.json", asset_key(module_id)?);
        let content: ContentResponse = self.load(&file_name).await?;

        Ok(content.for_module(module_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_key_rejects_paths() {
        assert!(asset_key("c1").is_ok());
        assert!(asset_key("a-1_b.2").is_ok());
        assert!(asset_key("").is_err());
        assert!(asset_key("../secret").is_err());
        assert!(asset_key("a/b").is_err());
    }

    #[test]
    fn test_default_latency() {
        let source = JsonAssetRemoteDataSource::new("/assets");
        assert_eq!(source.latency(), Duration::from_millis(2000));
        assert_eq!(source.directory(), Path::new("/assets"));
    }
}
