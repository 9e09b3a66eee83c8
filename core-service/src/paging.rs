//! # Paged Sequences
//!
//! Position-addressable views over a local list query.
//!
//! A [`PagedSequence`] counts its rows once, preloads the first
//! `initial_load_size` of them and loads the rest on demand in windows of
//! `page_size`. The total and every item already handed out stay fixed for
//! the life of the sequence; when the store changes the repository emits a
//! new sequence with a higher [`generation`](PagedSequence::generation).
//!
//! ```rust,ignore
//! let mut cursor = Some(0);
//! while let Some(offset) = cursor {
//!     let slice = sequence.next_page(offset).await?;
//!     render(&slice.items);
//!     cursor = slice.next_cursor;
//! }
//! ```

use async_trait::async_trait;
use core_catalog::{
    CourseEntity, CourseQuery, LocalDataSource, PageRequest, Result as CatalogResult,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::trace;

pub use core_runtime::config::PagingConfig;

/// Backing query of a [`PagedSequence`].
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn count(&self) -> CatalogResult<u64>;

    async fn load(&self, page: PageRequest) -> CatalogResult<Vec<T>>;
}

/// One window handed out by [`PagedSequence::next_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    /// Cursor of the following window, `None` at the end
    pub next_cursor: Option<u64>,
    pub has_more: bool,
}

/// Lazily loaded, ordered view over a local query.
///
/// Clones share the loaded items.
pub struct PagedSequence<T> {
    source: Arc<dyn PageSource<T>>,
    config: PagingConfig,
    total: u64,
    generation: u64,
    loaded: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for PagedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config,
            total: self.total,
            generation: self.generation,
            loaded: Arc::clone(&self.loaded),
        }
    }
}

impl<T> PagedSequence<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Count the rows and preload the initial window.
    pub async fn create(
        source: Arc<dyn PageSource<T>>,
        config: PagingConfig,
        generation: u64,
    ) -> CatalogResult<Self> {
        let total = source.count().await?;
        let initial = window_len(config.initial_load_size);

        let mut items = if total == 0 {
            Vec::new()
        } else {
            source.load(PageRequest::first(initial)).await?
        };
        items.truncate(clamp_len(total));

        trace!(total, preloaded = items.len(), generation, "Paged sequence created");

        Ok(Self {
            source,
            config,
            total,
            generation,
            loaded: Arc::new(Mutex::new(items)),
        })
    }

    /// Total number of rows.
    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> PagingConfig {
        self.config
    }

    /// Items loaded so far, from position zero.
    pub fn loaded(&self) -> Vec<T> {
        self.lock().clone()
    }

    pub fn loaded_len(&self) -> u64 {
        self.lock().len() as u64
    }

    /// Item at `position`, loading pages up to it if needed.
    pub async fn get(&self, position: u64) -> CatalogResult<Option<T>> {
        if position >= self.total {
            return Ok(None);
        }

        while self.loaded_len() <= position {
            if !self.load_next_window().await? {
                break;
            }
        }

        Ok(self.lock().get(clamp_len(position)).cloned())
    }

    /// The window starting at `cursor`.
    ///
    /// Cursor `0` yields the preloaded initial window; every later window is
    /// `page_size` wide.
    pub async fn next_page(&self, cursor: u64) -> CatalogResult<PageSlice<T>> {
        if cursor >= self.total {
            return Ok(PageSlice {
                items: Vec::new(),
                next_cursor: None,
                has_more: false,
            });
        }

        let width = if cursor == 0 {
            self.config.initial_load_size
        } else {
            self.config.page_size
        };
        let end = cursor.saturating_add(width.max(1) as u64).min(self.total);

        while self.loaded_len() < end {
            if !self.load_next_window().await? {
                break;
            }
        }

        let items: Vec<T> = {
            let loaded = self.lock();
            let start = clamp_len(cursor).min(loaded.len());
            let stop = clamp_len(end).min(loaded.len());
            loaded[start..stop].to_vec()
        };

        let reached = cursor + items.len() as u64;
        let has_more = !items.is_empty() && reached < self.total;

        Ok(PageSlice {
            items,
            next_cursor: has_more.then_some(reached),
            has_more,
        })
    }

    /// A fresh sequence over the same query, starting from position zero.
    pub async fn restart(&self) -> CatalogResult<Self> {
        Self::create(Arc::clone(&self.source), self.config, self.generation + 1).await
    }

    /// Load the window right after the loaded items. Returns `false` when
    /// the query yields nothing more.
    async fn load_next_window(&self) -> CatalogResult<bool> {
        let offset = self.loaded_len();
        if offset >= self.total {
            return Ok(false);
        }

        let request = PageRequest::new(
            u32::try_from(offset).unwrap_or(u32::MAX),
            window_len(self.config.page_size),
        );
        let page = self.source.load(request).await?;
        if page.is_empty() {
            return Ok(false);
        }

        let mut loaded = self.lock();
        // Another clone may have loaded the same window meanwhile
        if loaded.len() as u64 == offset {
            let room = clamp_len(self.total).saturating_sub(loaded.len());
            loaded.extend(page.into_iter().take(room));
        }

        Ok(true)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        match self.loaded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<T> fmt::Debug for PagedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedSequence")
            .field("total", &self.total)
            .field("generation", &self.generation)
            .field("config", &self.config)
            .finish()
    }
}

fn window_len(size: usize) -> u32 {
    u32::try_from(size.max(1)).unwrap_or(u32::MAX)
}

fn clamp_len(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Course list query as a [`PageSource`].
pub struct CoursePageSource {
    local: Arc<dyn LocalDataSource>,
    query: CourseQuery,
}

impl CoursePageSource {
    pub fn new(local: Arc<dyn LocalDataSource>, query: CourseQuery) -> Self {
        Self { local, query }
    }
}

#[async_trait]
impl PageSource<CourseEntity> for CoursePageSource {
    async fn count(&self) -> CatalogResult<u64> {
        self.local.count_courses(self.query).await
    }

    async fn load(&self, page: PageRequest) -> CatalogResult<Vec<CourseEntity>> {
        self.local.courses_page(self.query, page).await
    }
}

/// Builds course sequences with increasing generations.
#[derive(Clone)]
pub struct PagedSequenceFactory {
    local: Arc<dyn LocalDataSource>,
    config: PagingConfig,
    generation: Arc<AtomicU64>,
}

impl PagedSequenceFactory {
    pub fn new(local: Arc<dyn LocalDataSource>, config: PagingConfig) -> Self {
        Self {
            local,
            config,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> PagingConfig {
        self.config
    }

    pub async fn courses(&self, query: CourseQuery) -> CatalogResult<PagedSequence<CourseEntity>> {
        let source: Arc<dyn PageSource<CourseEntity>> =
            Arc::new(CoursePageSource::new(Arc::clone(&self.local), query));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        PagedSequence::create(source, self.config, generation).await
    }
}
