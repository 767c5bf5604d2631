//! Sync status of the local collection.
//!
//! Provides [`SyncState`] and [`SyncStatus`] for observing how the local
//! collection relates to the persistence service. A failed fetch never raises;
//! it moves the status to [`SyncState::Degraded`] until a later fetch succeeds.
//!
//! # Usage
//!
//! ```rust
//! use fieldwatch_core::{SyncState, SyncStatus};
//!
//! let status = SyncStatus::new("outbreak-map");
//! assert_eq!(status.state(), SyncState::Idle);
//!
//! status.set_state(SyncState::synced(12));
//! assert!(status.state().is_synced());
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::{Error, Result};

// ============================================================================
// SyncState
// ============================================================================

/// Relationship of the local collection to the canonical one.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncState {
    /// Nothing fetched yet.
    Idle,
    /// The last fetch succeeded.
    Synced {
        /// Reports held after the fetch.
        reports: usize,
        /// When the fetch was applied.
        at: DateTime<Utc>,
    },
    /// The last fetch failed; local state is the previous one.
    Degraded(String),
    /// The owning component was torn down.
    Stopped,
}

impl SyncState {
    /// A synced state stamped now.
    pub fn synced(reports: usize) -> Self {
        Self::Synced {
            reports,
            at: Utc::now(),
        }
    }

    /// Returns `true` if the last fetch succeeded.
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced { .. })
    }

    /// Returns `true` if the last fetch failed.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Returns `true` once the component is torn down.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Synced { reports, at } => {
                write!(f, "synced: {reports} report(s) at {}", at.format("%H:%M:%S"))
            }
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

// ============================================================================
// SyncStatus
// ============================================================================

/// Thread-safe handle for observing and updating the sync state.
///
/// Cheap to clone (Arc internals). State changes are broadcast
/// to all subscribers via a watch channel.
#[derive(Clone)]
pub struct SyncStatus {
    inner: Arc<SyncStatusInner>,
}

struct SyncStatusInner {
    name: String,
    tx: watch::Sender<SyncState>,
}

impl SyncStatus {
    /// Creates a handle in [`SyncState::Idle`].
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(SyncState::Idle);
        Self {
            inner: Arc::new(SyncStatusInner {
                name: name.into(),
                tx,
            }),
        }
    }

    /// Name of the component this status belongs to.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        self.inner.tx.borrow().clone()
    }

    /// Updates the state and notifies subscribers.
    pub fn set_state(&self, state: SyncState) {
        match &state {
            SyncState::Degraded(_) => log::warn!("Sync '{}' → {state}", self.inner.name),
            _ => log::debug!("Sync '{}' → {state}", self.inner.name),
        }
        self.inner.tx.send_replace(state);
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.tx.subscribe()
    }

    /// Waits until a fetch has succeeded.
    ///
    /// Fails on timeout, or if the component stops first.
    pub async fn wait_synced(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.subscribe();
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        {
            let state = rx.borrow_and_update().clone();
            match state {
                SyncState::Synced { .. } => return Ok(()),
                SyncState::Stopped => return Err(self.stopped_error()),
                _ => {}
            }
        }

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    return Err(Error::timeout(
                        format!("Waiting for '{}' to sync (state: {})", self.inner.name, self.state()),
                        timeout,
                    ));
                }
                result = rx.changed() => {
                    if result.is_err() {
                        return Err(self.stopped_error());
                    }
                    let state = rx.borrow().clone();
                    match state {
                        SyncState::Synced { .. } => return Ok(()),
                        SyncState::Stopped => return Err(self.stopped_error()),
                        _ => continue,
                    }
                }
            }
        }
    }

    fn stopped_error(&self) -> Error {
        Error::persistence(format!("'{}' stopped before syncing", self.inner.name))
    }
}

impl fmt::Debug for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStatus")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
