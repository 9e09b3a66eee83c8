//! # Network-Bound Resources
//!
//! Cache-first reads that refresh the local store from the remote catalog
//! when it is stale.
//!
//! ## Lifecycle
//!
//! ```text
//! subscribe ─> load local ─> LOADING(local)
//!                               │
//!                   should_fetch? ──no──> SUCCESS(local)
//!                               │yes
//!                  remote call (network pool)
//!                    │ok                    │err
//!      save (disk pool) ─> SUCCESS(reread)  ERROR(msg, local)
//!                               │
//!              every later local write ─> re-read ─> same status
//! ```
//!
//! Local writes that land while the remote call is in flight are re-read and
//! delivered as `LOADING`. After a failed refresh the stream stays in `ERROR`
//! until the observer goes away. The driver runs on the main-thread pool and
//! stops as soon as the [`ResourceStream`] is dropped.

use async_trait::async_trait;
use core_catalog::{ChangeListener, LocalDataSource, Result as CatalogResult, Table};
use core_runtime::events::{CatalogEvent, EventBus};
use core_runtime::AppExecutors;
use provider_academy::Result as RemoteResult;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

use crate::resource::Resource;
use crate::stream::{resource_channel, ResourceSender, ResourceStream};

/// One cache-first read.
///
/// Implementations describe where the data lives and how to refill it; the
/// driver started by [`launch`] owns the emission order.
#[async_trait]
pub trait NetworkBoundResource: Send + Sync + 'static {
    /// Snapshot type delivered to observers.
    type Data: Clone + Send + Sync + 'static;
    /// Remote payload written back by [`save_call_result`](Self::save_call_result).
    type Remote: Send + 'static;

    /// Resource name used in logs, events and not-found messages.
    fn name(&self) -> &'static str;

    /// Identifying key, if the read targets one record.
    fn key(&self) -> Option<&str> {
        None
    }

    /// Tables whose writes invalidate this read.
    fn tables(&self) -> &'static [Table];

    async fn load_from_db(&self) -> CatalogResult<Option<Self::Data>>;

    /// Whether the cached value needs a remote refresh.
    async fn should_fetch(&self, cached: Option<&Self::Data>) -> CatalogResult<bool>;

    async fn create_call(&self, cached: Option<Self::Data>) -> RemoteResult<Self::Remote>;

    /// Persist the remote payload. Returns the number of records written.
    async fn save_call_result(&self, remote: Self::Remote) -> CatalogResult<u64>;
}

/// Shared handles every driver needs.
#[derive(Clone)]
pub struct DriverContext {
    pub local: Arc<dyn LocalDataSource>,
    pub executors: AppExecutors,
    pub events: EventBus,
}

/// Start driving `resource` and hand back its snapshot stream.
///
/// The change subscription is taken before this returns, so writes made
/// after the call are never missed.
pub fn launch<R>(resource: R, ctx: &DriverContext) -> ResourceStream<R::Data>
where
    R: NetworkBoundResource,
{
    let (sender, stream) = resource_channel();
    let listener = ctx.local.changes(resource.tables());
    let span = info_span!("resource", name = resource.name(), key = resource.key());

    let driver = Driver {
        resource: Arc::new(resource),
        executors: ctx.executors.clone(),
        events: ctx.events.clone(),
        sender,
        failure: None,
    };

    ctx.executors
        .spawn_on_main(driver.run(listener).instrument(span));

    stream
}

struct Driver<R: NetworkBoundResource> {
    resource: Arc<R>,
    executors: AppExecutors,
    events: EventBus,
    sender: ResourceSender<R::Data>,
    /// Message of the failed refresh; keeps later snapshots in `ERROR`.
    failure: Option<String>,
}

impl<R: NetworkBoundResource> Driver<R> {
    async fn run(mut self, mut listener: ChangeListener) {
        let Some(cached) = self.reload().await else {
            return;
        };
        if !self.sender.send(Resource::loading(cached.clone())) {
            return;
        }

        let stale = match self.resource.should_fetch(cached.as_ref()).await {
            Ok(stale) => stale,
            Err(e) => {
                self.local_failure(e);
                return;
            }
        };

        let current = if stale {
            match self.refresh(cached, &mut listener).await {
                Some(current) => current,
                None => return,
            }
        } else {
            cached
        };

        if !self.deliver(current) {
            return;
        }

        self.follow(listener).await;
    }

    /// Fetch and save. Returns the data to deliver next, or `None` once the
    /// stream is finished.
    async fn refresh(
        &mut self,
        cached: Option<R::Data>,
        listener: &mut ChangeListener,
    ) -> Option<Option<R::Data>> {
        debug!("Refreshing from remote");
        self.events
            .emit(CatalogEvent::RefreshStarted {
                resource: self.resource.name().to_string(),
                key: self.key(),
            })
            .ok();

        let mut latest = cached.clone();
        let fetched = {
            let resource = Arc::clone(&self.resource);
            let call = self
                .executors
                .run_on_network(async move { resource.create_call(cached).await });
            tokio::pin!(call);

            let mut listening = true;
            loop {
                tokio::select! {
                    result = &mut call => break result,
                    changed = listener.changed(), if listening => {
                        if !changed {
                            listening = false;
                            continue;
                        }
                        listener.drain();
                        latest = self.reload().await?;
                        if !self.sender.send(Resource::loading(latest.clone())) {
                            return None;
                        }
                    }
                    _ = self.sender.closed() => return None,
                }
            }
        };

        let outcome = match fetched {
            Ok(Ok(remote)) => {
                let resource = Arc::clone(&self.resource);
                match self
                    .executors
                    .run_on_disk(async move { resource.save_call_result(remote).await })
                    .await
                {
                    Ok(Ok(items)) => Ok(items),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(e) => Err(e.to_string()),
                }
            }
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(items) => {
                debug!(items, "Remote data saved");
                self.events
                    .emit(CatalogEvent::RefreshCompleted {
                        resource: self.resource.name().to_string(),
                        key: self.key(),
                        items,
                    })
                    .ok();

                listener.drain();
                self.reload().await
            }
            Err(message) => {
                warn!(error = %message, "Remote refresh failed");
                self.events
                    .emit(CatalogEvent::RefreshFailed {
                        resource: self.resource.name().to_string(),
                        key: self.key(),
                        message: message.clone(),
                    })
                    .ok();

                self.failure = Some(message);
                Some(latest)
            }
        }
    }

    /// Re-read and re-deliver on every relevant local write.
    async fn follow(&self, mut listener: ChangeListener) {
        loop {
            tokio::select! {
                changed = listener.changed() => {
                    if !changed {
                        debug!("Change feed closed");
                        return;
                    }
                    listener.drain();
                    let Some(current) = self.reload().await else {
                        return;
                    };
                    if !self.deliver(current) {
                        return;
                    }
                }
                _ = self.sender.closed() => {
                    debug!("Observer gone");
                    return;
                }
            }
        }
    }

    /// Read the local value. `None` means the read failed and the stream
    /// has been closed with an error.
    async fn reload(&self) -> Option<Option<R::Data>> {
        match self.resource.load_from_db().await {
            Ok(data) => Some(data),
            Err(e) => {
                self.local_failure(e);
                None
            }
        }
    }

    /// Send the settled snapshot for `data`. Returns `false` once the
    /// observer is gone.
    fn deliver(&self, data: Option<R::Data>) -> bool {
        let snapshot = match (&self.failure, data) {
            (Some(message), data) => Resource::error(message.clone(), data),
            (None, Some(data)) => Resource::success(data),
            (None, None) => Resource::error(self.not_found_message(), None),
        };
        self.sender.send(snapshot)
    }

    fn local_failure(&self, error: core_catalog::CatalogError) {
        warn!(error = %error, "Local read failed");
        self.sender.send(Resource::error(error.to_string(), None));
    }

    fn not_found_message(&self) -> String {
        match self.resource.key() {
            Some(key) => format!("{} {} not found", self.resource.name(), key),
            None => format!("{} not found", self.resource.name()),
        }
    }

    fn key(&self) -> Option<String> {
        self.resource.key().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Status;
    use bridge_desktop::TokioTaskExecutor;
    use core_catalog::{db::create_test_pool, ChangeTracker, SqliteLocalDataSource};
    use futures::StreamExt;
    use provider_academy::RemoteError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// A single number cached in memory; writes go through the tracker.
    struct Number {
        store: Arc<Mutex<Option<u32>>>,
        remote: std::result::Result<u32, String>,
        calls: Arc<AtomicUsize>,
        tracker: ChangeTracker,
    }

    #[async_trait]
    impl NetworkBoundResource for Number {
        type Data = u32;
        type Remote = u32;

        fn name(&self) -> &'static str {
            "number"
        }

        fn key(&self) -> Option<&str> {
            Some("n1")
        }

        fn tables(&self) -> &'static [Table] {
            &[Table::Courses]
        }

        async fn load_from_db(&self) -> CatalogResult<Option<u32>> {
            Ok(*self.store.lock().unwrap())
        }

        async fn should_fetch(&self, cached: Option<&u32>) -> CatalogResult<bool> {
            Ok(cached.is_none())
        }

        async fn create_call(&self, _cached: Option<u32>) -> RemoteResult<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.remote.clone().map_err(RemoteError::Network)
        }

        async fn save_call_result(&self, remote: u32) -> CatalogResult<u64> {
            *self.store.lock().unwrap() = Some(remote);
            self.tracker.notify(Table::Courses);
            Ok(1)
        }
    }

    struct Fixture {
        ctx: DriverContext,
        tracker: ChangeTracker,
        store: Arc<Mutex<Option<u32>>>,
        calls: Arc<AtomicUsize>,
    }

    impl Fixture {
        async fn new(initial: Option<u32>) -> Self {
            let pool = create_test_pool().await.unwrap();
            let local = SqliteLocalDataSource::new(pool);
            let tracker = local.tracker().clone();
            let executor = Arc::new(TokioTaskExecutor::unbounded("test").unwrap());

            Self {
                ctx: DriverContext {
                    local: Arc::new(local),
                    executors: AppExecutors::single(executor),
                    events: EventBus::new(16),
                },
                tracker,
                store: Arc::new(Mutex::new(initial)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn resource(&self, remote: std::result::Result<u32, String>) -> Number {
            Number {
                store: Arc::clone(&self.store),
                remote,
                calls: Arc::clone(&self.calls),
                tracker: self.tracker.clone(),
            }
        }

        fn write(&self, value: u32) {
            *self.store.lock().unwrap() = Some(value);
            self.tracker.notify(Table::Courses);
        }
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_remote() {
        let fixture = Fixture::new(Some(7)).await;
        let mut stream = launch(fixture.resource(Ok(9)), &fixture.ctx);

        assert_eq!(stream.next().await.unwrap(), Resource::loading(Some(7)));
        assert_eq!(stream.next().await.unwrap(), Resource::success(7));
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_is_refreshed() {
        let fixture = Fixture::new(None).await;
        let mut events = fixture.ctx.events.subscribe();
        let mut stream = launch(fixture.resource(Ok(9)), &fixture.ctx);

        assert_eq!(stream.next().await.unwrap(), Resource::loading(None));
        assert_eq!(stream.next().await.unwrap(), Resource::success(9));
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 1);

        assert!(matches!(
            events.recv().await.unwrap(),
            CatalogEvent::RefreshStarted { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            CatalogEvent::RefreshCompleted { items: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_failure_stays_in_error() {
        let fixture = Fixture::new(None).await;
        let mut stream = launch(fixture.resource(Err("offline".to_string())), &fixture.ctx);

        assert!(stream.next().await.unwrap().is_loading());

        let failed = stream.next().await.unwrap();
        assert_eq!(failed.status(), Status::Error);
        assert!(failed.message().unwrap().contains("offline"));
        assert_eq!(failed.data(), None);

        fixture.write(3);
        let after_write = stream.next().await.unwrap();
        assert_eq!(after_write.status(), Status::Error);
        assert_eq!(after_write.data(), Some(&3));
    }

    #[tokio::test]
    async fn test_live_updates_follow_local_writes() {
        let fixture = Fixture::new(Some(1)).await;
        let mut stream = launch(fixture.resource(Ok(9)), &fixture.ctx);

        stream.next().await.unwrap();
        assert_eq!(stream.next().await.unwrap(), Resource::success(1));

        fixture.write(2);
        assert_eq!(stream.next().await.unwrap(), Resource::success(2));
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_driver() {
        let fixture = Fixture::new(Some(1)).await;
        let mut stream = launch(fixture.resource(Ok(9)), &fixture.ctx);
        stream.next().await.unwrap();
        stream.next().await.unwrap();
        assert_eq!(fixture.tracker.listener_count(), 1);

        drop(stream);

        for _ in 0..50 {
            if fixture.tracker.listener_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(fixture.tracker.listener_count(), 0);
    }

    struct Missing;

    #[async_trait]
    impl NetworkBoundResource for Missing {
        type Data = u32;
        type Remote = ();

        fn name(&self) -> &'static str {
            "course"
        }

        fn key(&self) -> Option<&str> {
            Some("c404")
        }

        fn tables(&self) -> &'static [Table] {
            &[Table::Courses]
        }

        async fn load_from_db(&self) -> CatalogResult<Option<u32>> {
            Ok(None)
        }

        async fn should_fetch(&self, _cached: Option<&u32>) -> CatalogResult<bool> {
            Ok(false)
        }

        async fn create_call(&self, _cached: Option<u32>) -> RemoteResult<()> {
            Ok(())
        }

        async fn save_call_result(&self, _remote: ()) -> CatalogResult<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let fixture = Fixture::new(None).await;
        let mut stream = launch(Missing, &fixture.ctx);

        assert!(stream.next().await.unwrap().is_loading());
        let missing = stream.next().await.unwrap();
        assert!(missing.is_error());
        assert_eq!(missing.message(), Some("course c404 not found"));
    }
}
