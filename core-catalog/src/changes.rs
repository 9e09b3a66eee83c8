//! Table-level change notifications.
//!
//! Every committed write publishes the [`Table`]s it touched. Readers hold a
//! [`ChangeListener`] filtered to the tables their query reads and re-run the
//! query when it fires.
//!
//! ```rust
//! use core_catalog::changes::{ChangeTracker, Table};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let tracker = ChangeTracker::default();
//! let mut listener = tracker.subscribe(&[Table::Courses]);
//!
//! tracker.notify(Table::Modules);
//! tracker.notify(Table::Courses);
//!
//! assert!(listener.changed().await);
//! # }
//! ```

use std::fmt;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::trace;

const DEFAULT_CHANGE_BUFFER: usize = 64;

/// Tables of the catalog cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Courses,
    Modules,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Courses => write!(f, "courses"),
            Table::Modules => write!(f, "modules"),
        }
    }
}

/// Broadcast registry of table invalidations.
#[derive(Clone)]
pub struct ChangeTracker {
    sender: broadcast::Sender<Table>,
}

impl ChangeTracker {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announce a committed write to `table`.
    pub fn notify(&self, table: Table) {
        // No listeners is fine
        let receivers = self.sender.send(table).unwrap_or(0);
        trace!(%table, receivers, "Table changed");
    }

    /// Listen for writes to any of `tables`. Earlier writes are not replayed.
    pub fn subscribe(&self, tables: &[Table]) -> ChangeListener {
        ChangeListener {
            receiver: self.sender.subscribe(),
            tables: tables.to_vec(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_BUFFER)
    }
}

impl fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// Receiving end of a [`ChangeTracker`] subscription, filtered by table.
///
/// Dropping the listener unsubscribes it.
pub struct ChangeListener {
    receiver: broadcast::Receiver<Table>,
    tables: Vec<Table>,
}

impl ChangeListener {
    /// Wait for the next write to a watched table.
    ///
    /// Returns `false` once the tracker is gone and no further changes can
    /// arrive. Missed notifications (lag) count as a change. Cancel safe.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.receiver.recv().await {
                Ok(table) if self.watches(table) => return true,
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => return true,
                Err(RecvError::Closed) => return false,
            }
        }
    }

    /// Discard notifications already queued.
    ///
    /// Returns whether any of them concerned a watched table. A reader calls
    /// this right before re-running its query so a burst of writes costs one
    /// re-read.
    pub fn drain(&mut self) -> bool {
        let mut pending = false;
        loop {
            match self.receiver.try_recv() {
                Ok(table) => pending |= self.watches(table),
                Err(TryRecvError::Lagged(_)) => pending = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return pending,
            }
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn watches(&self, table: Table) -> bool {
        self.tables.contains(&table)
    }
}

impl fmt::Debug for ChangeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeListener")
            .field("tables", &self.tables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_listener_ignores_unwatched_tables() {
        let tracker = ChangeTracker::default();
        let mut listener = tracker.subscribe(&[Table::Modules]);

        tracker.notify(Table::Courses);

        let waited = tokio::time::timeout(Duration::from_millis(50), listener.changed()).await;
        assert!(waited.is_err(), "course writes must not wake a module reader");

        tracker.notify(Table::Modules);
        assert!(listener.changed().await);
    }

    #[tokio::test]
    async fn test_drain_coalesces_burst() {
        let tracker = ChangeTracker::default();
        let mut listener = tracker.subscribe(&[Table::Courses, Table::Modules]);

        tracker.notify(Table::Courses);
        tracker.notify(Table::Modules);
        tracker.notify(Table::Courses);

        assert!(listener.drain());
        assert!(!listener.drain());
    }

    #[tokio::test]
    async fn test_drain_reports_only_watched_tables() {
        let tracker = ChangeTracker::default();
        let mut listener = tracker.subscribe(&[Table::Courses]);

        tracker.notify(Table::Modules);
        assert!(!listener.drain());
    }

    #[tokio::test]
    async fn test_lag_counts_as_change() {
        let tracker = ChangeTracker::new(1);
        let mut listener = tracker.subscribe(&[Table::Courses]);

        tracker.notify(Table::Modules);
        tracker.notify(Table::Modules);
        tracker.notify(Table::Modules);

        assert!(listener.changed().await);
    }

    #[tokio::test]
    async fn test_closed_tracker_stops_listener() {
        let tracker = ChangeTracker::default();
        let mut listener = tracker.subscribe(&[Table::Courses]);
        drop(tracker);

        assert!(!listener.changed().await);
    }

    #[test]
    fn test_listener_count() {
        let tracker = ChangeTracker::default();
        let listener = tracker.subscribe(&[Table::Courses]);
        assert_eq!(tracker.listener_count(), 1);
        drop(listener);
        assert_eq!(tracker.listener_count(), 0);
    }
}
