//! Handle to the background phase of a mutation.
//!
//! The local half of every mutation has already happened by the time a
//! [`PendingSync`] is returned. Awaiting it is optional: dropping the handle
//! leaves the task running on the runtime.

use crate::shared::record_id::RecordId;
use std::future::Future;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

/// Result of the remote half of a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The operation was accepted, locally at least
    pub success: bool,
    /// The server acknowledged it
    pub synced: bool,
    pub message: Option<String>,
    /// Id of the affected record after reconciliation
    pub id: Option<RecordId>,
}

impl WriteOutcome {
    pub fn synced(id: Option<RecordId>) -> Self {
        Self {
            success: true,
            synced: true,
            message: None,
            id,
        }
    }

    /// Kept locally; the server never confirmed it
    pub fn local_only(id: Option<RecordId>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            synced: false,
            message: Some(message.into()),
            id,
        }
    }

    /// Refused before anything changed
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            synced: false,
            message: Some(message.into()),
            id: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Background sync task failed: {0}")]
    Task(#[from] JoinError),
}

/// Background half of a mutation, either still running or already known
#[derive(Debug)]
pub struct PendingSync<T> {
    state: PendingState<T>,
}

#[derive(Debug)]
enum PendingState<T> {
    Running(JoinHandle<T>),
    Ready(T),
}

impl<T: Send + 'static> PendingSync<T> {
    /// Run `future` on the current tokio runtime
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            state: PendingState::Running(tokio::spawn(future)),
        }
    }

    pub(crate) fn ready(value: T) -> Self {
        Self {
            state: PendingState::Ready(value),
        }
    }

    pub fn is_settled(&self) -> bool {
        match &self.state {
            PendingState::Running(handle) => handle.is_finished(),
            PendingState::Ready(_) => true,
        }
    }

    /// Wait for the background phase to finish
    pub async fn wait(self) -> Result<T, SyncError> {
        match self.state {
            PendingState::Running(handle) => Ok(handle.await?),
            PendingState::Ready(value) => Ok(value),
        }
    }

    /// Let the task finish on its own
    pub fn detach(self) {}
}
