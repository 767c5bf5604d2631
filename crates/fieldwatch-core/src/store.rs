//! The local raw-report collection.
//!
//! [`ReportStore`] is the single owner of the collection. It has two writers
//! (the reconciliation loop replacing it, the insert buffer appending to it)
//! and any number of readers. Every mutation goes through one watch channel,
//! so readers only ever observe a fully replaced or fully appended snapshot,
//! and every mutation bumps the revision and notifies subscribers.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::Result;
use crate::cluster::{ClusterMap, aggregate};
use crate::projection::MapView;
use crate::types::DiseaseReport;

// ============================================================================
// ReportSnapshot
// ============================================================================

/// An immutable view of the collection at one revision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSnapshot {
    /// Reports in insertion order.
    pub reports: Arc<Vec<DiseaseReport>>,
    /// Monotonic revision, bumped on every mutation.
    pub revision: u64,
}

impl ReportSnapshot {
    /// Number of reports.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Returns `true` if the snapshot holds no reports.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Aggregates the snapshot into clusters.
    pub fn clusters(&self) -> ClusterMap {
        aggregate(&self.reports)
    }

    /// Projects the snapshot into a map view.
    pub fn view(&self) -> MapView {
        MapView::from_reports(self.revision, &self.reports)
    }
}

// ============================================================================
// ReportStore
// ============================================================================

/// Shared handle to the collection.
///
/// Cheap to clone (Arc internals). Changes are broadcast to all subscribers.
#[derive(Clone)]
pub struct ReportStore {
    inner: Arc<ReportStoreInner>,
}

struct ReportStoreInner {
    tx: watch::Sender<ReportSnapshot>,
}

impl ReportStore {
    /// Creates an empty store at revision 0.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReportSnapshot::default());
        Self {
            inner: Arc::new(ReportStoreInner { tx }),
        }
    }

    /// Creates a store seeded with reports.
    pub fn with_reports(reports: Vec<DiseaseReport>) -> Self {
        let store = Self::new();
        store.replace(reports);
        store
    }

    /// Current snapshot.
    pub fn read(&self) -> ReportSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Current revision.
    pub fn revision(&self) -> u64 {
        self.inner.tx.borrow().revision
    }

    /// Number of reports held.
    pub fn len(&self) -> usize {
        self.inner.tx.borrow().len()
    }

    /// Returns `true` if the store holds no reports.
    pub fn is_empty(&self) -> bool {
        self.inner.tx.borrow().is_empty()
    }

    /// Replaces the whole collection and returns the new revision.
    ///
    /// Reports with invalid coordinates are filtered out first.
    pub fn replace(&self, reports: Vec<DiseaseReport>) -> u64 {
        let before = reports.len();
        let reports: Vec<_> = reports
            .into_iter()
            .filter(|r| r.coordinates.is_valid())
            .collect();
        if reports.len() < before {
            log::debug!(
                "Filtered {} report(s) with invalid coordinates",
                before - reports.len()
            );
        }

        let mut revision = 0;
        self.inner.tx.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.reports = Arc::new(reports);
            revision = snapshot.revision;
        });
        log::debug!("Store replaced: {} report(s), revision {revision}", self.len());
        revision
    }

    /// Empties the collection and returns the new revision.
    pub fn clear(&self) -> u64 {
        self.replace(Vec::new())
    }

    /// Appends one report and returns the new revision.
    ///
    /// The report is validated first; an invalid report leaves the
    /// collection untouched.
    pub fn append(&self, report: DiseaseReport) -> Result<u64> {
        report.validate()?;
        let mut revision = 0;
        self.inner.tx.send_modify(|snapshot| {
            snapshot.revision += 1;
            Arc::make_mut(&mut snapshot.reports).push(report);
            revision = snapshot.revision;
        });
        Ok(revision)
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<ReportSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Aggregates the current collection.
    pub fn clusters(&self) -> ClusterMap {
        self.read().clusters()
    }

    /// Projects the current collection.
    pub fn view(&self) -> MapView {
        self.read().view()
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.tx.borrow();
        f.debug_struct("ReportStore")
            .field("reports", &snapshot.len())
            .field("revision", &snapshot.revision)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
