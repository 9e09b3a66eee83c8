//! # Application Executors
//!
//! Three independent worker pools decouple blocking work from the act of
//! subscribing:
//!
//! - `disk_io` runs local-store writes
//! - `network_io` runs remote catalog fetches
//! - `main_thread` runs the drivers that deliver snapshots to observers
//!
//! Work is handed over with [`AppExecutors::run_on_disk`] /
//! [`AppExecutors::run_on_network`], which resolve once the task has finished
//! on the target pool.

use crate::error::{Error, Result};
use bridge_traits::background::TaskExecutor;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Bundle of the worker pools used by the repository layer.
#[derive(Clone)]
pub struct AppExecutors {
    disk_io: Arc<dyn TaskExecutor>,
    network_io: Arc<dyn TaskExecutor>,
    main_thread: Arc<dyn TaskExecutor>,
}

impl AppExecutors {
    pub fn new(
        disk_io: Arc<dyn TaskExecutor>,
        network_io: Arc<dyn TaskExecutor>,
        main_thread: Arc<dyn TaskExecutor>,
    ) -> Self {
        Self {
            disk_io,
            network_io,
            main_thread,
        }
    }

    /// Use one pool for all three roles (handy in tests).
    pub fn single(executor: Arc<dyn TaskExecutor>) -> Self {
        Self::new(Arc::clone(&executor), Arc::clone(&executor), executor)
    }

    pub fn disk_io(&self) -> &Arc<dyn TaskExecutor> {
        &self.disk_io
    }

    pub fn network_io(&self) -> &Arc<dyn TaskExecutor> {
        &self.network_io
    }

    pub fn main_thread(&self) -> &Arc<dyn TaskExecutor> {
        &self.main_thread
    }

    /// Run `future` on the disk pool and wait for its output.
    pub async fn run_on_disk<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        dispatch(self.disk_io.as_ref(), future).await
    }

    /// Run `future` on the network pool and wait for its output.
    pub async fn run_on_network<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        dispatch(self.network_io.as_ref(), future).await
    }

    /// Start a long-running delivery task; never waits for it.
    pub fn spawn_on_main<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.main_thread.execute(future.boxed());
    }
}

impl fmt::Debug for AppExecutors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppExecutors")
            .field("disk_io", &self.disk_io.name())
            .field("network_io", &self.network_io.name())
            .field("main_thread", &self.main_thread.name())
            .finish()
    }
}

/// Schedule `future` on `executor` and resolve with its output.
///
/// Fails with [`Error::TaskDropped`] if the pool discards the task without
/// running it to completion.
pub async fn dispatch<F, T>(executor: &dyn TaskExecutor, future: F) -> Result<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    executor.execute(
        async move {
            // The caller may have gone away; the result is then discarded.
            let _ = tx.send(future.await);
        }
        .boxed(),
    );

    rx.await.map_err(|_| Error::TaskDropped {
        pool: executor.name().to_string(),
    })
}
