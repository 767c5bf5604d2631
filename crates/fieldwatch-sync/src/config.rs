//! Sync engine settings.

use fieldwatch_core::{DEFAULT_MIN_CONFIDENCE, LocationRequest, Result, types};
use std::time::Duration;

/// Default period of the reconciliation loop.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(10);

/// Default delay before the reconciliation that follows an insert.
pub const DEFAULT_FORCED_RECONCILE_DELAY: Duration = Duration::from_secs(2);

/// Reporter used for detections when none is configured.
pub const DEFAULT_USER_ID: &str = "scanner-user";

/// Settings of an [`OutbreakMap`](crate::OutbreakMap).
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Period of the reconciliation loop.
    pub reconcile_interval: Duration,
    /// Delay before the reconciliation scheduled after each insert.
    pub forced_reconcile_delay: Duration,
    /// Reporter stamped on inserted detections.
    pub default_user_id: String,
    /// Origin tag stamped on inserted detections.
    pub detection_method: String,
    /// Minimum classifier confidence for a detection to be reported.
    pub min_confidence: f64,
    /// Options for own-position lookups.
    pub location: LocationRequest,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            forced_reconcile_delay: DEFAULT_FORCED_RECONCILE_DELAY,
            default_user_id: DEFAULT_USER_ID.to_string(),
            detection_method: types::DEFAULT_DETECTION_METHOD.to_string(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            location: LocationRequest::default(),
        }
    }
}

impl SyncConfig {
    /// Sets the reconciliation period.
    pub fn with_reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = interval;
        self
    }

    /// Sets the delay of the post-insert reconciliation.
    pub fn with_forced_reconcile_delay(mut self, delay: Duration) -> Self {
        self.forced_reconcile_delay = delay;
        self
    }

    /// Sets the reporter of inserted detections.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.default_user_id = user_id.into();
        self
    }

    /// Sets the origin tag of inserted detections.
    pub fn with_detection_method(mut self, method: impl Into<String>) -> Self {
        self.detection_method = method.into();
        self
    }

    /// Sets the detection confidence threshold.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Sets the own-position lookup options.
    pub fn with_location(mut self, location: LocationRequest) -> Self {
        self.location = location;
        self
    }

    /// Checks that the settings can drive an engine.
    pub fn validate(&self) -> Result<()> {
        if self.reconcile_interval.is_zero() {
            return Err(fieldwatch_core::Error::config(
                "reconcile interval must be greater than zero",
            ));
        }
        if self.default_user_id.trim().is_empty() {
            return Err(fieldwatch_core::Error::config("default user id must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(fieldwatch_core::Error::config(format!(
                "minimum confidence {} is outside [0, 1]",
                self.min_confidence
            )));
        }
        Ok(())
    }
}
