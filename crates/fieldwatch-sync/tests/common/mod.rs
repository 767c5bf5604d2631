//! Common test utilities and harness for sync integration tests.

use fieldwatch_core::{Coordinates, DetectedDisease, InMemoryRepository, NewRecord};
use fieldwatch_sync::{OutbreakMap, SyncConfig};
use std::sync::Arc;
use std::time::Duration;

/// Test harness: a map over an in-memory repository.
pub struct TestHarness {
    /// The repository behind the map.
    pub repo: Arc<InMemoryRepository>,
    /// The map under test.
    pub map: OutbreakMap,
}

impl TestHarness {
    /// A map that reconciles every `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let config = SyncConfig::default().with_reconcile_interval(interval);
        let map = OutbreakMap::new(repo.clone(), config).expect("valid config");
        Self { repo, map }
    }

    /// A map whose schedule never fires again after the first pass.
    pub fn quiet() -> Self {
        Self::with_interval(Duration::from_secs(3600))
    }

    /// Stores a detection directly in the repository.
    pub async fn seed(&self, lat: f64, lng: f64) {
        use fieldwatch_core::ReportRepository;
        self.repo
            .create(NewRecord::detection(
                "field-team",
                Coordinates::new(lat, lng).unwrap(),
                "Late blight",
                0.93,
                "PLANT_SCANNER",
            ))
            .await
            .unwrap();
    }
}

/// Lets spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// A confident late blight detection.
pub fn blight() -> DetectedDisease {
    DetectedDisease::new("Late blight", 0.97).unwrap()
}

/// A valid position in the test field.
pub fn field(lat: f64, lng: f64) -> Coordinates {
    Coordinates::new(lat, lng).unwrap()
}
