//! Background Execution
//!
//! Worker-pool abstraction used to keep blocking work off the context that
//! registers observers.

use futures::future::BoxFuture;

/// A unit of work handed to an executor
pub type BoxedTask = BoxFuture<'static, ()>;

/// Worker pool trait
///
/// The repository layer uses three independent pools:
/// - **disk I/O**: local-store writes
/// - **network I/O**: remote catalog fetches
/// - **main thread**: result delivery to observers
///
/// Implementations decide how many tasks run concurrently. `execute` must not
/// block the caller; the task runs at some later point on the pool.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::background::TaskExecutor;
///
/// fn refresh(executor: &dyn TaskExecutor) {
///     executor.execute(Box::pin(async move {
///         // talk to the network
///     }));
/// }
/// ```
pub trait TaskExecutor: Send + Sync {
    /// Human readable pool name used in logs
    fn name(&self) -> &str;

    /// Schedule a task on this pool
    fn execute(&self, task: BoxedTask);
}
