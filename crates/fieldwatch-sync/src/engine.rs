//! The outbreak map component.
//!
//! [`OutbreakMap`] owns the local collection and wires the reconciliation
//! loop, the optimistic insert buffer and the projection together:
//!
//! ```text
//!   repository ──list──▶ Reconciler ──replace──▶ ReportStore ──▶ projector ──▶ MapView
//!        ▲                                          ▲
//!        └──create── OptimisticInserter ──append────┘
//! ```
//!
//! Renderers subscribe to [`OutbreakMap::subscribe`] and receive a new
//! [`MapView`] whenever the set of zones changes.

use fieldwatch_core::{
    Classification, ClusterMap, Coordinates, DetectedDisease, DetectionGate, DiseaseReport, Error,
    LocationProvider, MapView, ReportRepository, ReportStore, Result, SyncState, SyncStatus,
    acquire,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SyncConfig;
use crate::insert::OptimisticInserter;
use crate::lifecycle::Lifecycle;
use crate::reconcile::{ReconcileOutcome, Reconciler};

/// Name of the sync status of every map.
const STATUS_NAME: &str = "outbreak-map";

/// A live outbreak map synced with one repository.
///
/// Background work starts with [`start`](Self::start) and ends with
/// [`stop`](Self::stop) or drop. Must be started inside a tokio runtime.
pub struct OutbreakMap {
    config: SyncConfig,
    reconciler: Reconciler,
    inserter: OptimisticInserter,
    gate: DetectionGate,
    location: Option<Arc<dyn LocationProvider>>,
    views: Arc<watch::Sender<Arc<MapView>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl OutbreakMap {
    /// Creates a map over `repo`. Nothing runs until [`start`](Self::start).
    pub fn new(repo: Arc<dyn ReportRepository>, config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let reconciler = Reconciler::new(
            repo,
            ReportStore::new(),
            SyncStatus::new(STATUS_NAME),
            Lifecycle::new(),
        );
        let inserter = OptimisticInserter::new(
            reconciler.clone(),
            config.default_user_id.clone(),
            config.detection_method.clone(),
            config.forced_reconcile_delay,
        );
        let (views, _rx) = watch::channel(Arc::new(MapView::default()));
        Ok(Self {
            gate: DetectionGate::new(config.min_confidence),
            config,
            reconciler,
            inserter,
            location: None,
            views: Arc::new(views),
            tasks: Vec::new(),
        })
    }

    /// Sets the source of the reporter's own position.
    pub fn with_location_provider(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(provider);
        self
    }

    /// Starts the reconciliation loop and the projector.
    ///
    /// The first reconciliation runs immediately. Calling this on a running
    /// map does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.reconciler.lifecycle().start();
        self.tasks.push(self.spawn_projector());
        self.tasks
            .push(self.reconciler.spawn_loop(self.config.reconcile_interval));
        tracing::info!(
            interval = ?self.config.reconcile_interval,
            repo = self.reconciler.repository().name(),
            "Outbreak map started"
        );
    }

    /// Tears the map down.
    ///
    /// Cancels the loop timer and every pending forced reconciliation.
    /// Fetches already in flight complete, but their results are discarded.
    pub fn stop(&mut self) {
        if !self.reconciler.lifecycle().is_active() && self.tasks.is_empty() {
            return;
        }
        self.reconciler.lifecycle().stop();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.reconciler.status().set_state(SyncState::Stopped);
        tracing::info!("Outbreak map stopped");
    }

    /// Returns `true` while background work is running.
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty() && self.reconciler.lifecycle().is_active()
    }

    /// Republishes the projection when the zones change.
    fn spawn_projector(&self) -> JoinHandle<()> {
        let mut snapshots = self.reconciler.store().subscribe();
        let views = self.views.clone();
        tokio::spawn(async move {
            loop {
                let snapshot = snapshots.borrow_and_update().clone();
                let view = snapshot.view();
                views.send_if_modified(|current| {
                    if current.units == view.units && current.report_count == view.report_count {
                        return false;
                    }
                    *current = Arc::new(view);
                    true
                });
                if snapshots.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Settings the map was built with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The local collection.
    pub fn store(&self) -> &ReportStore {
        self.reconciler.store()
    }

    /// The sync status.
    pub fn status(&self) -> &SyncStatus {
        self.reconciler.status()
    }

    /// Current reports.
    pub fn reports(&self) -> Arc<Vec<DiseaseReport>> {
        self.store().read().reports
    }

    /// Current clusters.
    pub fn clusters(&self) -> ClusterMap {
        self.store().clusters()
    }

    /// Projection of the current collection, computed now.
    pub fn view(&self) -> MapView {
        self.store().view()
    }

    /// Subscribes to projection updates.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MapView>> {
        self.views.subscribe()
    }

    /// Reconciles once, outside the schedule.
    pub async fn refresh(&self) -> Result<ReconcileOutcome> {
        self.reconciler.reconcile_once().await
    }

    /// Saves a detection at `coordinates` and shows it immediately.
    pub async fn report_detection(
        &self,
        detected: &DetectedDisease,
        coordinates: Coordinates,
    ) -> Result<DiseaseReport> {
        self.inserter.insert(detected, coordinates).await
    }

    /// Gates a classifier result and reports it if it qualifies.
    ///
    /// Returns `Ok(None)` for healthy or low-confidence classifications.
    pub async fn report_classification(
        &self,
        classification: &Classification,
        coordinates: Coordinates,
    ) -> Result<Option<DiseaseReport>> {
        match self.gate.evaluate(classification) {
            Some(detected) => self.report_detection(&detected, coordinates).await.map(Some),
            None => Ok(None),
        }
    }

    /// Saves a detection at the reporter's own position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocationUnavailable`], before any save call, when no
    /// position can be obtained.
    pub async fn report_here(&self, detected: &DetectedDisease) -> Result<DiseaseReport> {
        let provider = self
            .location
            .as_deref()
            .ok_or_else(|| Error::location_unavailable("no location provider configured"))?;
        let coordinates = acquire(provider, &self.config.location).await?;
        self.report_detection(detected, coordinates).await
    }

    /// Deletes every stored report and empties the map.
    ///
    /// Returns the number of deleted reports. On failure the local
    /// collection is left as it was.
    pub async fn clear_all(&self) -> Result<u64> {
        let summary = self
            .reconciler
            .repository()
            .delete_all()
            .await
            .inspect_err(|e| tracing::warn!("Clearing reports failed: {e}"))?;
        if self.reconciler.lifecycle().is_active() {
            self.store().clear();
            self.status().set_state(SyncState::synced(0));
        }
        tracing::info!(deleted = summary.deleted_count, "Cleared all reports");
        Ok(summary.deleted_count)
    }
}

impl Drop for OutbreakMap {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for OutbreakMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutbreakMap")
            .field("reconciler", &self.reconciler)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fieldwatch_core::{FixedLocation, InMemoryRepository};
    use std::time::Duration;

    fn map() -> (OutbreakMap, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let config = SyncConfig::default().with_reconcile_interval(Duration::from_secs(3600));
        (OutbreakMap::new(repo.clone(), config).unwrap(), repo)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let repo = Arc::new(InMemoryRepository::new());
        let config = SyncConfig::default().with_reconcile_interval(Duration::ZERO);
        assert!(OutbreakMap::new(repo, config).is_err());
    }

    #[tokio::test]
    async fn test_report_here_without_provider() {
        let (map, repo) = map();
        let detected = DetectedDisease::new("Late blight", 0.95).unwrap();
        let err = map.report_here(&detected).await.unwrap_err();
        assert!(matches!(err, Error::LocationUnavailable { .. }));
        assert_eq!(repo.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_report_here_denied_sends_nothing() {
        let (map, repo) = map();
        let map = map.with_location_provider(Arc::new(FixedLocation::denied()));
        let detected = DetectedDisease::new("Late blight", 0.95).unwrap();
        assert!(map.report_here(&detected).await.is_err());
        assert_eq!(repo.create_calls(), 0);
        assert!(map.store().is_empty());
    }

    #[tokio::test]
    async fn test_report_here_uses_provider_position() {
        let (map, _) = map();
        let here = Coordinates::new(29.219577, 79.513203).unwrap();
        let map = map.with_location_provider(Arc::new(FixedLocation::at(here)));
        let detected = DetectedDisease::new("Late blight", 0.95).unwrap();
        let report = map.report_here(&detected).await.unwrap();
        assert_eq!(report.coordinates, here);
        assert_eq!(map.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_report_classification_gates() {
        let (map, repo) = map();
        let here = Coordinates::new(28.0, 79.0).unwrap();
        let healthy = Classification::new("Tomato___healthy", 0.99);
        assert!(map.report_classification(&healthy, here).await.unwrap().is_none());
        let weak = Classification::new("Tomato___Late_blight", 0.5);
        assert!(map.report_classification(&weak, here).await.unwrap().is_none());
        assert_eq!(repo.create_calls(), 0);

        let sick = Classification::new("Tomato___Late_blight", 0.95);
        let report = map.report_classification(&sick, here).await.unwrap().unwrap();
        assert_eq!(report.disease_type, "Late blight");
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (mut map, _) = map();
        map.start();
        assert!(map.is_running());
        map.stop();
        map.stop();
        assert!(!map.is_running());
        assert!(map.status().state().is_stopped());
    }
}
