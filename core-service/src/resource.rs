//! Status-tagged snapshots delivered to observers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle tag of a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Local data (if any) is shown while a refresh may still be running.
    Loading,
    /// Data reflects a settled local store.
    Success,
    /// The refresh failed; data is the last known local value, if any.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Loading => write!(f, "LOADING"),
            Status::Success => write!(f, "SUCCESS"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

/// One immutable snapshot of a repository read.
///
/// `Success` always carries data. `Error` carries a message and possibly
/// stale data. `Loading` carries the last known data, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource<T> {
    status: Status,
    data: Option<T>,
    message: Option<String>,
}

impl<T> Resource<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: Status::Error,
            data,
            message: Some(message.into()),
        }
    }

    pub fn loading(data: Option<T>) -> Self {
        Self {
            status: Status::Loading,
            data,
            message: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Transform the payload, keeping status and message.
    pub fn map<U, F>(self, f: F) -> Resource<U>
    where
        F: FnOnce(T) -> U,
    {
        Resource {
            status: self.status,
            data: self.data.map(f),
            message: self.message,
        }
    }
}
