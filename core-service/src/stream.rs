//! Observer side of a repository read.

use crate::resource::Resource;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Ordered sequence of [`Resource`] snapshots for one read.
///
/// Poll it with `StreamExt::next`. Dropping the stream unregisters the
/// observer; the task feeding it stops at its next delivery attempt.
pub struct ResourceStream<T> {
    receiver: mpsc::UnboundedReceiver<Resource<T>>,
}

impl<T> ResourceStream<T> {
    /// Snapshot already queued, without waiting.
    pub fn try_next(&mut self) -> Option<Resource<T>> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Stream for ResourceStream<T> {
    type Item = Resource<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> fmt::Debug for ResourceStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStream").finish_non_exhaustive()
    }
}

/// Producer half held by the driver task.
pub(crate) struct ResourceSender<T> {
    sender: mpsc::UnboundedSender<Resource<T>>,
}

impl<T> ResourceSender<T> {
    /// Deliver a snapshot. Returns `false` once the observer is gone.
    pub(crate) fn send(&self, resource: Resource<T>) -> bool {
        self.sender.send(resource).is_ok()
    }

    /// Resolves when the observer drops its stream.
    pub(crate) async fn closed(&self) {
        self.sender.closed().await
    }
}

pub(crate) fn resource_channel<T>() -> (ResourceSender<T>, ResourceStream<T>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ResourceSender { sender }, ResourceStream { receiver })
}
