//! Reconciliation of the local collection with the persistence service.
//!
//! Each pass fetches the whole canonical collection and replaces the local
//! one in full. There is no merge: anything appended locally since the fetch
//! started is overwritten until a later pass includes it.

use fieldwatch_core::{
    ReportRepository, ReportStore, Result, SyncState, SyncStatus, normalize_records,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::lifecycle::Lifecycle;

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The fetched collection replaced the local one.
    Applied {
        /// Reports now held locally.
        reports: usize,
        /// Fetched records dropped at the boundary.
        dropped: usize,
        /// Store revision after the replace.
        revision: u64,
    },
    /// The fetch resolved after teardown or restart; its result was thrown away.
    Discarded,
}

/// Runs reconciliation passes against one repository and store.
///
/// Cheap to clone; clones share the store, status and lifecycle.
#[derive(Clone)]
pub struct Reconciler {
    repo: Arc<dyn ReportRepository>,
    store: ReportStore,
    status: SyncStatus,
    lifecycle: Lifecycle,
}

impl Reconciler {
    /// Creates a reconciler.
    pub fn new(
        repo: Arc<dyn ReportRepository>,
        store: ReportStore,
        status: SyncStatus,
        lifecycle: Lifecycle,
    ) -> Self {
        Self {
            repo,
            store,
            status,
            lifecycle,
        }
    }

    /// The persistence collaborator.
    pub fn repository(&self) -> &Arc<dyn ReportRepository> {
        &self.repo
    }

    /// The local collection.
    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// The sync status.
    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// The lifecycle flag.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Performs one fetch-and-replace pass.
    ///
    /// On failure the local collection is left untouched, the status becomes
    /// [`SyncState::Degraded`] and the error is returned for callers that
    /// want it; the loop ignores it. Results arriving after teardown, or
    /// after a restart that began while the fetch was in flight, are
    /// discarded whatever they are.
    pub async fn reconcile_once(&self) -> Result<ReconcileOutcome> {
        let generation = self.lifecycle.generation();
        let fetched = self.repo.list().await;

        if !self.lifecycle.is_current(generation) {
            tracing::debug!(generation, "Discarding fetch result from a torn-down run");
            return Ok(ReconcileOutcome::Discarded);
        }

        match fetched {
            Ok(records) => {
                let batch = normalize_records(&records);
                if batch.dropped > 0 {
                    tracing::debug!(dropped = batch.dropped, "Dropped malformed records");
                }
                let dropped = batch.dropped;
                let revision = self.store.replace(batch.reports);
                let reports = self.store.len();
                self.status.set_state(SyncState::synced(reports));
                tracing::debug!(reports, revision, "Reconciled with {}", self.repo.name());
                Ok(ReconcileOutcome::Applied {
                    reports,
                    dropped,
                    revision,
                })
            }
            Err(e) => {
                tracing::warn!("Reconciliation failed, keeping previous reports: {e}");
                self.status.set_state(SyncState::Degraded(e.to_string()));
                Err(e)
            }
        }
    }

    /// Spawns the recurring loop.
    ///
    /// The first pass runs immediately. Each pass runs in its own task, so
    /// ending the loop never cancels a fetch already in flight. The loop ends
    /// when the lifecycle stops or the returned handle is aborted.
    pub fn spawn_loop(&self, interval: Duration) -> JoinHandle<()> {
        let this = self.clone();
        let interval = interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(?interval, "Reconciliation loop started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = this.lifecycle.stopped() => break,
                }
                let pass = this.clone();
                tokio::spawn(async move {
                    // Failures are already logged and reflected in the status.
                    let _ = pass.reconcile_once().await;
                });
            }
            tracing::info!("Reconciliation loop stopped");
        })
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("repo", &self.repo.name())
            .field("store", &self.store)
            .field("status", &self.status)
            .finish()
    }
}
