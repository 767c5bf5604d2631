//! Optimistic insertion of fresh detections.
//!
//! A detection is saved first and appended locally only once the persistence
//! service has confirmed it, so the collection never holds a report that was
//! not accepted. The append makes it visible before the next scheduled pass;
//! a delayed forced pass then lets the canonical collection correct any drift.

use chrono::Utc;
use fieldwatch_core::{Coordinates, DetectedDisease, DiseaseReport, Error, NewRecord, Result};
use std::time::Duration;

use crate::reconcile::Reconciler;

/// Saves detections and appends them to the local collection.
#[derive(Clone, Debug)]
pub struct OptimisticInserter {
    reconciler: Reconciler,
    user_id: String,
    detection_method: String,
    forced_reconcile_delay: Duration,
}

impl OptimisticInserter {
    /// Creates an inserter stamping every detection with `user_id` and
    /// `detection_method`.
    pub fn new(
        reconciler: Reconciler,
        user_id: impl Into<String>,
        detection_method: impl Into<String>,
        forced_reconcile_delay: Duration,
    ) -> Self {
        Self {
            reconciler,
            user_id: user_id.into(),
            detection_method: detection_method.into(),
            forced_reconcile_delay,
        }
    }

    /// Saves a detection and appends the confirmed report.
    ///
    /// Not idempotent: two calls create two reports.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty disease label, a confidence
    /// outside `[0, 1]` or invalid coordinates, before anything is sent. Any
    /// failure of the save call, or a response without an id, returns
    /// [`Error::InsertRejected`] and leaves the collection untouched.
    pub async fn insert(
        &self,
        detected: &DetectedDisease,
        coordinates: Coordinates,
    ) -> Result<DiseaseReport> {
        let draft = DiseaseReport::new(
            detected.disease_type.clone(),
            coordinates,
            detected.confidence,
        )?
        .with_user(self.user_id.clone())
        .with_detection_method(self.detection_method.clone());

        let payload = NewRecord::detection(
            draft.user_id.clone(),
            coordinates,
            draft.disease_type.clone(),
            draft.confidence,
            self.detection_method.clone(),
        );
        let lifecycle = self.reconciler.lifecycle();
        let generation = lifecycle.generation();
        let saved = self
            .reconciler
            .repository()
            .create(payload)
            .await
            .map_err(Error::into_insert_rejected)?;
        let id = saved
            .id
            .clone()
            .ok_or_else(|| Error::insert_rejected("persistence service returned no id"))?;

        let report = draft
            .with_id(id)
            .with_timestamp(saved.created_at.unwrap_or_else(Utc::now));

        if lifecycle.is_current(generation) {
            let revision = self.reconciler.store().append(report.clone())?;
            tracing::info!(
                id = ?report.id,
                disease = %report.disease_type,
                revision,
                "Appended confirmed report"
            );
            self.schedule_forced_reconcile();
        } else {
            tracing::debug!(generation, "Saved report after teardown; not appending");
        }
        Ok(report)
    }

    /// Runs one extra pass after the configured delay, unless torn down first.
    fn schedule_forced_reconcile(&self) {
        let reconciler = self.reconciler.clone();
        let delay = self.forced_reconcile_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = reconciler.lifecycle().stopped() => return,
            }
            // Failures are already logged and reflected in the status.
            let _ = reconciler.reconcile_once().await;
        });
    }
}
