//! Core service façade and bootstrap helpers.
//!
//! This crate turns a [`CoreConfig`] into a ready [`AcademyRepository`]: it
//! opens the SQLite cache, picks the remote catalog source and wires both to
//! the worker pools. Desktop hosts typically keep the default
//! `desktop-shims` feature (which depends on `bridge-desktop`) so the HTTP
//! client and pools are created on demand; other hosts inject their own
//! through the configuration builder.
//!
//! ```no_run
//! # async fn example() -> core_service::Result<()> {
//! use core_runtime::config::CoreConfig;
//! use futures::StreamExt;
//!
//! let config = CoreConfig::builder()
//!     .database_path("academy.db")
//!     .remote_base_url("https://catalog.example.com/api")
//!     .build()?;
//!
//! let core = core_service::bootstrap(config).await?;
//! let mut courses = core.repository().get_all_courses();
//! while let Some(snapshot) = courses.next().await {
//!     println!("{}", snapshot.status());
//! }
//! # Ok(())
//! # }
//! ```

pub mod bound_resource;
pub mod error;
pub mod paging;
pub mod repository;
pub mod resource;
pub mod stream;

pub use error::{CoreError, Result};
pub use paging::{PageSlice, PagedSequence, PagingConfig};
pub use repository::AcademyRepository;
pub use resource::{Resource, Status};
pub use stream::ResourceStream;

use std::sync::Arc;

use bridge_traits::http::HttpClient;
use core_catalog::db::{create_pool, DatabaseConfig};
use core_catalog::{LocalDataSource, SqliteLocalDataSource};
use core_runtime::config::{CoreConfig, RemoteSourceConfig, StorageLocation};
use core_runtime::events::EventBus;
use core_runtime::AppExecutors;
use provider_academy::{HttpRemoteDataSource, JsonAssetRemoteDataSource, RemoteDataSource};
use sqlx::SqlitePool;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    repository: AcademyRepository,
    pool: SqlitePool,
}

impl CoreService {
    pub fn repository(&self) -> &AcademyRepository {
        &self.repository
    }

    /// Diagnostic event bus shared with the repository.
    pub fn events(&self) -> &EventBus {
        self.repository.events()
    }

    /// Close the catalog database. Open streams stop receiving updates.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Build the core from `config`.
///
/// Fails with [`CoreError::CapabilityMissing`] when the HTTP source or the
/// worker pools are needed but neither injected nor available from the
/// desktop defaults.
pub async fn bootstrap(config: CoreConfig) -> Result<CoreService> {
    config.validate()?;

    let database = match &config.storage {
        StorageLocation::File(path) => DatabaseConfig::new(path.clone()),
        StorageLocation::InMemory => DatabaseConfig::in_memory(),
    };
    let pool = create_pool(database).await?;
    let local: Arc<dyn LocalDataSource> = Arc::new(SqliteLocalDataSource::new(pool.clone()));

    let remote: Arc<dyn RemoteDataSource> = match &config.remote {
        RemoteSourceConfig::Http { base_url } => Arc::new(HttpRemoteDataSource::new(
            resolve_http_client(&config)?,
            base_url.clone(),
        )),
        RemoteSourceConfig::Assets { directory, latency } => {
            Arc::new(JsonAssetRemoteDataSource::new(directory.clone()).with_latency(*latency))
        }
    };

    let executors = resolve_executors(&config)?;
    let events = EventBus::new(config.event_buffer_size);

    info!(
        storage = ?config.storage,
        remote = ?config.remote,
        executors = ?executors,
        "Academy core ready"
    );

    Ok(CoreService {
        repository: AcademyRepository::new(local, remote, executors, events, config.paging),
        pool,
    })
}

fn resolve_http_client(config: &CoreConfig) -> Result<Arc<dyn HttpClient>> {
    if let Some(client) = &config.http_client {
        return Ok(Arc::clone(client));
    }

    #[cfg(feature = "desktop-shims")]
    {
        let client = bridge_desktop::ReqwestHttpClient::new()?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "desktop-shims"))]
    {
        Err(CoreError::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "Inject an HttpClient or enable the desktop-shims feature".to_string(),
        })
    }
}

fn resolve_executors(config: &CoreConfig) -> Result<AppExecutors> {
    if let Some(executors) = &config.executors {
        return Ok(executors.clone());
    }

    #[cfg(feature = "desktop-shims")]
    {
        use bridge_desktop::TokioTaskExecutor;

        let pools = &config.executor_config;
        Ok(AppExecutors::new(
            Arc::new(TokioTaskExecutor::bounded(
                "disk-io",
                pools.disk_io_concurrency,
            )?),
            Arc::new(TokioTaskExecutor::bounded(
                "network-io",
                pools.network_io_concurrency,
            )?),
            Arc::new(TokioTaskExecutor::unbounded("main-thread")?),
        ))
    }

    #[cfg(not(feature = "desktop-shims"))]
    {
        Err(CoreError::CapabilityMissing {
            capability: "TaskExecutor".to_string(),
            message: "Inject AppExecutors or enable the desktop-shims feature".to_string(),
        })
    }
}
