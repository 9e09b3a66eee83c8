//! # Event Bus System
//!
//! Broadcasts diagnostic catalog events using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The repository publishes a [`CatalogEvent`] whenever it starts, finishes or
//! fails a remote refresh, and whenever a local annotation (bookmark, read
//! flag) changes. Hosts subscribe to drive progress indicators or telemetry.
//! Observers of catalog data do not need the bus; they receive `Resource`
//! snapshots directly.
//!
//! ```text
//! ┌────────────┐   emit   ┌──────────┐  subscribe  ┌────────────┐
//! │ Repository ├─────────>│ EventBus ├────────────>│ Subscriber │
//! └────────────┘          └──────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CatalogEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CatalogEvent::ModuleRead {
//!     module_id: "m1".to_string(),
//! })
//! .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Module marked as read");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; it can keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender was dropped; treat it as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Events emitted by the catalog repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// A stale resource triggered a remote fetch.
    RefreshStarted {
        /// Resource name (e.g. "all_courses").
        resource: String,
        /// Identifying key, absent for whole-catalog reads.
        key: Option<String>,
    },
    /// Remote data was written to the local store.
    RefreshCompleted {
        resource: String,
        key: Option<String>,
        /// Number of records written.
        items: u64,
    },
    /// The remote fetch failed; observers received an error snapshot.
    RefreshFailed {
        resource: String,
        key: Option<String>,
        /// Human-readable error message.
        message: String,
    },
    /// A course bookmark flag was written locally.
    BookmarkChanged { course_id: String, bookmarked: bool },
    /// A module was marked as read locally.
    ModuleRead { module_id: String },
}

impl CatalogEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CatalogEvent::RefreshStarted { .. } => "Remote refresh started",
            CatalogEvent::RefreshCompleted { .. } => "Remote refresh completed",
            CatalogEvent::RefreshFailed { .. } => "Remote refresh failed",
            CatalogEvent::BookmarkChanged { .. } => "Course bookmark changed",
            CatalogEvent::ModuleRead { .. } => "Module marked as read",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CatalogEvent::RefreshFailed { .. } => EventSeverity::Warning,
            CatalogEvent::RefreshCompleted { .. } => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

impl fmt::Display for CatalogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Central broadcast channel for catalog events.
///
/// Cloning the bus yields another handle onto the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall behind by more than `capacity` events receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if nobody is listening.
    pub fn emit(&self, event: CatalogEvent) -> Result<usize, SendError<CatalogEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
