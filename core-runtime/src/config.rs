//! # Core Configuration Module
//!
//! Provides configuration management for the Academy catalog core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance holding every setting and injected bridge the core needs. It
//! enforces fail-fast validation so a misconfigured host learns about it at
//! startup rather than on the first catalog read.
//!
//! ## Required Settings
//!
//! - Local store location: a database file path or in-memory
//! - Remote catalog source: an HTTP base URL or a JSON asset directory
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `AppExecutors` - worker pools (desktop default: Tokio pools sized from
//!   [`ExecutorConfig`])
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/path/to/academy.db")
//!     .remote_base_url("https://academy.example.com/api")
//!     .page_size(8)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.paging.page_size, 8);
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No remote source configured
//! let config = CoreConfig::builder()
//!     .in_memory_database()
//!     .build()
//!     .expect("Should fail - missing remote source");
//! ```

use crate::error::{Error, Result};
use crate::executors::AppExecutors;
use bridge_traits::HttpClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Latency applied by the asset-backed remote source unless overridden.
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_millis(2000);

/// Where the local catalog cache lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// SQLite database file, created on first use.
    File(PathBuf),
    /// Private in-memory database, discarded on shutdown.
    InMemory,
}

/// Where remote catalog payloads come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSourceConfig {
    /// JSON endpoints under `base_url`.
    Http { base_url: String },
    /// Bundled `courses.json` / `module_<id>.json` / `content_<id>.json` files.
    Assets {
        directory: PathBuf,
        latency: Duration,
    },
}

/// Page sizing for course lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Rows loaded per page after the first.
    pub page_size: usize,
    /// Rows preloaded when a sequence is created.
    pub initial_load_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 4,
            initial_load_size: 4,
        }
    }
}

/// Concurrency limits for the default worker pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Local-store writers. One keeps writes serialized.
    pub disk_io_concurrency: usize,
    /// Concurrent remote fetches.
    pub network_io_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            disk_io_concurrency: 1,
            network_io_concurrency: 3,
        }
    }
}

/// Core configuration for the Academy catalog core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Local SQLite cache location
    pub storage: StorageLocation,

    /// Remote catalog source
    pub remote: RemoteSourceConfig,

    /// Course list paging
    pub paging: PagingConfig,

    /// Default pool sizing (ignored when `executors` is injected)
    pub executor_config: ExecutorConfig,

    /// Capacity of the diagnostic event bus
    pub event_buffer_size: usize,

    /// HTTP client for the HTTP remote source (optional with desktop default)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Pre-built worker pools (optional with desktop default)
    pub executors: Option<AppExecutors>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("storage", &self.storage)
            .field("remote", &self.remote)
            .field("paging", &self.paging)
            .field("executor_config", &self.executor_config)
            .field("event_buffer_size", &self.event_buffer_size)
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("executors", &self.executors)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Database path is not empty
    /// - Remote base URL is an http(s) URL, asset directory is not empty
    /// - Page sizes and pool sizes are at least 1
    pub fn validate(&self) -> Result<()> {
        if let StorageLocation::File(path) = &self.storage {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Database path cannot be empty".to_string()));
            }
        }

        match &self.remote {
            RemoteSourceConfig::Http { base_url } => {
                let trimmed = base_url.trim();
                if trimmed.is_empty() {
                    return Err(Error::Config("Remote base URL cannot be empty".to_string()));
                }
                if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
                    return Err(Error::Config(format!(
                        "Remote base URL must start with http:// or https://, got '{}'",
                        trimmed
                    )));
                }
            }
            RemoteSourceConfig::Assets { directory, .. } => {
                if directory.as_os_str().is_empty() {
                    return Err(Error::Config(
                        "Asset directory cannot be empty".to_string(),
                    ));
                }
            }
        }

        if self.paging.page_size == 0 {
            return Err(Error::Config(
                "Page size must be greater than 0".to_string(),
            ));
        }

        if self.paging.initial_load_size == 0 {
            return Err(Error::Config(
                "Initial load size must be greater than 0".to_string(),
            ));
        }

        if self.executor_config.disk_io_concurrency == 0
            || self.executor_config.network_io_concurrency == 0
        {
            return Err(Error::Config(
                "Executor pools need a concurrency of at least 1".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn remote_source_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "RemoteDataSource".to_string(),
        message: "A remote catalog source is required to refill the local cache. \
                 Use .remote_base_url() for the HTTP catalog service or \
                 .asset_directory() for bundled JSON payloads."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    storage: Option<StorageLocation>,
    remote: Option<RemoteSourceConfig>,
    simulated_latency: Option<Duration>,
    paging: PagingConfig,
    executor_config: ExecutorConfig,
    event_buffer_size: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
    executors: Option<AppExecutors>,
}

impl CoreConfigBuilder {
    /// Sets the database path.
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder()
    ///     .database_path("/path/to/academy.db");
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage = Some(StorageLocation::File(path.into()));
        self
    }

    /// Keep the local cache in memory only.
    pub fn in_memory_database(mut self) -> Self {
        self.storage = Some(StorageLocation::InMemory);
        self
    }

    /// Fetch the catalog from JSON endpoints under `base_url`.
    pub fn remote_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.remote = Some(RemoteSourceConfig::Http {
            base_url: base_url.into(),
        });
        self
    }

    /// Read the catalog from bundled JSON files in `directory`.
    pub fn asset_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.remote = Some(RemoteSourceConfig::Assets {
            directory: directory.into(),
            latency: DEFAULT_SIMULATED_LATENCY,
        });
        self
    }

    /// Delay applied before each asset read. Only affects asset sources.
    pub fn simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.paging.page_size = size;
        self
    }

    pub fn initial_load_size(mut self, size: usize) -> Self {
        self.paging.initial_load_size = size;
        self
    }

    pub fn disk_io_concurrency(mut self, concurrency: usize) -> Self {
        self.executor_config.disk_io_concurrency = concurrency;
        self
    }

    pub fn network_io_concurrency(mut self, concurrency: usize) -> Self {
        self.executor_config.network_io_concurrency = concurrency;
        self
    }

    pub fn event_buffer_size(mut self, capacity: usize) -> Self {
        self.event_buffer_size = Some(capacity);
        self
    }

    /// Sets a custom HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use caller-provided worker pools instead of the Tokio defaults.
    pub fn executors(mut self, executors: AppExecutors) -> Self {
        self.executors = Some(executors);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error if no remote source is configured or if any value
    /// fails [`CoreConfig::validate`]. Without a storage location the cache
    /// is kept in memory.
    pub fn build(self) -> Result<CoreConfig> {
        let mut remote = self.remote.ok_or_else(remote_source_missing_error)?;

        if let (RemoteSourceConfig::Assets { latency, .. }, Some(custom)) =
            (&mut remote, self.simulated_latency)
        {
            *latency = custom;
        }

        let config = CoreConfig {
            storage: self.storage.unwrap_or(StorageLocation::InMemory),
            remote,
            paging: self.paging,
            executor_config: self.executor_config,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
            http_client: self.http_client,
            executors: self.executors,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_remote_source() {
        let result = CoreConfig::builder()
            .database_path("/tmp/academy.db")
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "RemoteDataSource")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let config = CoreConfig::builder()
            .remote_base_url("https://academy.example.com/api")
            .build()
            .unwrap();

        assert_eq!(config.storage, StorageLocation::InMemory);
        assert_eq!(config.paging, PagingConfig::default());
        assert_eq!(config.paging.page_size, 4);
        assert_eq!(config.paging.initial_load_size, 4);
        assert_eq!(config.executor_config.disk_io_concurrency, 1);
        assert_eq!(config.executor_config.network_io_concurrency, 3);
        assert!(config.http_client.is_none());
        assert!(config.executors.is_none());
    }

    #[test]
    fn test_asset_source_uses_default_latency() {
        let config = CoreConfig::builder()
            .asset_directory("/opt/academy/assets")
            .build()
            .unwrap();

        assert_eq!(
            config.remote,
            RemoteSourceConfig::Assets {
                directory: PathBuf::from("/opt/academy/assets"),
                latency: DEFAULT_SIMULATED_LATENCY,
            }
        );
    }

    #[test]
    fn test_simulated_latency_override() {
        let config = CoreConfig::builder()
            .simulated_latency(Duration::from_millis(5))
            .asset_directory("/opt/academy/assets")
            .build()
            .unwrap();

        match config.remote {
            RemoteSourceConfig::Assets { latency, .. } => {
                assert_eq!(latency, Duration::from_millis(5))
            }
            other => panic!("unexpected remote: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let result = CoreConfig::builder()
            .remote_base_url("ftp://academy.example.com")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));

        let result = CoreConfig::builder().remote_base_url("   ").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_database_path() {
        let result = CoreConfig::builder()
            .database_path("")
            .remote_base_url("https://academy.example.com")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let result = CoreConfig::builder()
            .remote_base_url("https://academy.example.com")
            .page_size(0)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let result = CoreConfig::builder()
            .remote_base_url("https://academy.example.com")
            .disk_io_concurrency(0)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_accepts_pathbuf() {
        let path = PathBuf::from("/tmp/academy.db");
        let config = CoreConfig::builder()
            .database_path(path.clone())
            .remote_base_url("http://localhost:8080")
            .build()
            .unwrap();
        assert_eq!(config.storage, StorageLocation::File(path));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = CoreConfig::builder()
            .in_memory_database()
            .remote_base_url("http://localhost:8080")
            .initial_load_size(12)
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.paging.initial_load_size, 12);
        assert!(format!("{:?}", cloned).contains("InMemory"));
    }
}
