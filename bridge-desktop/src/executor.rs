//! Worker pools on the Tokio runtime

use bridge_traits::{
    background::{BoxedTask, TaskExecutor},
    error::{BridgeError, Result},
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{trace, warn};

/// Tokio-backed worker pool.
///
/// Tasks are spawned on the runtime captured at construction time. A bounded
/// pool gates execution with a semaphore so at most `max_concurrency` tasks of
/// this pool make progress at once; a pool of size 1 runs its tasks one after
/// another.
#[derive(Clone)]
pub struct TokioTaskExecutor {
    name: String,
    handle: Handle,
    permits: Option<Arc<Semaphore>>,
}

impl TokioTaskExecutor {
    /// Create a pool that runs at most `max_concurrency` tasks at a time.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bounded(name: impl Into<String>, max_concurrency: usize) -> Result<Self> {
        if max_concurrency == 0 {
            return Err(BridgeError::ExecutorUnavailable(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(Self::with_handle(
            name,
            Self::current_handle()?,
            Some(max_concurrency),
        ))
    }

    /// Create a pool without a concurrency limit.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn unbounded(name: impl Into<String>) -> Result<Self> {
        Ok(Self::with_handle(name, Self::current_handle()?, None))
    }

    /// Create a pool on an explicit runtime handle.
    pub fn with_handle(
        name: impl Into<String>,
        handle: Handle,
        max_concurrency: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            handle,
            permits: max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    fn current_handle() -> Result<Handle> {
        Handle::try_current().map_err(|e| {
            BridgeError::ExecutorUnavailable(format!("No Tokio runtime available: {}", e))
        })
    }
}

impl TaskExecutor for TokioTaskExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, task: BoxedTask) {
        let permits = self.permits.clone();
        let pool = self.name.clone();

        self.handle.spawn(async move {
            let _permit = match permits {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        warn!(pool = %pool, "Executor closed; dropping task");
                        return;
                    }
                },
                None => None,
            };

            trace!(pool = %pool, "Running task");
            task.await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_zero_concurrency_rejected() {
        let result = TokioTaskExecutor::bounded("disk-io", 0);
        assert!(matches!(result, Err(BridgeError::ExecutorUnavailable(_))));
    }

    #[test]
    fn test_requires_runtime() {
        let result = TokioTaskExecutor::unbounded("main-thread");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_executes_task() {
        let executor = TokioTaskExecutor::unbounded("main-thread").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        executor.execute(Box::pin(async move {
            tx.send(42).unwrap();
        }));

        assert_eq!(rx.recv().await, Some(42));
        assert_eq!(executor.name(), "main-thread");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bounded_pool_limits_concurrency() {
        let executor = TokioTaskExecutor::bounded("disk-io", 1).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for _ in 0..5 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let tx = tx.clone();
            executor.execute(Box::pin(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                tx.send(()).unwrap();
            }));
        }
        drop(tx);

        let mut completed = 0;
        while rx.recv().await.is_some() {
            completed += 1;
        }

        assert_eq!(completed, 5);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
