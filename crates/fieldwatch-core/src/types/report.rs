//! The disease report: one geolocated observation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ANONYMOUS_USER, Coordinates, ReportId};
use crate::{Error, Result};

/// A single observation of a disease at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseReport {
    /// Persisted identifier; `None` until the persistence service confirms it.
    pub id: Option<ReportId>,
    /// Disease label, never empty.
    pub disease_type: String,
    /// Where the disease was observed.
    pub coordinates: Coordinates,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    /// How many observations this report stands for (at least 1).
    pub report_count: u32,
    /// Reporter, or [`ANONYMOUS_USER`].
    pub user_id: String,
    /// When the report was created.
    pub timestamp: DateTime<Utc>,
    /// Free-form origin tag such as `PLANT_SCANNER`.
    pub detection_method: Option<String>,
}

impl DiseaseReport {
    /// Creates an unconfirmed, anonymous single report stamped now.
    pub fn new(
        disease_type: impl Into<String>,
        coordinates: Coordinates,
        confidence: f64,
    ) -> Result<Self> {
        let report = Self {
            id: None,
            disease_type: disease_type.into(),
            coordinates,
            confidence,
            report_count: 1,
            user_id: ANONYMOUS_USER.to_string(),
            timestamp: Utc::now(),
            detection_method: None,
        };
        report.validate()?;
        Ok(report)
    }

    /// Sets the persisted identifier.
    pub fn with_id(mut self, id: impl Into<ReportId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the reporter; blank ids fall back to [`ANONYMOUS_USER`].
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        self.user_id = if user_id.trim().is_empty() {
            ANONYMOUS_USER.to_string()
        } else {
            user_id
        };
        self
    }

    /// Sets the report count.
    pub fn with_report_count(mut self, report_count: u32) -> Self {
        self.report_count = report_count;
        self
    }

    /// Sets the creation time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the detection method tag.
    pub fn with_detection_method(mut self, method: impl Into<String>) -> Self {
        self.detection_method = Some(method.into());
        self
    }

    /// Returns `true` once the persistence service has assigned an id.
    pub fn is_confirmed(&self) -> bool {
        self.id.is_some()
    }

    /// Checks every field invariant.
    pub fn validate(&self) -> Result<()> {
        if self.disease_type.trim().is_empty() {
            return Err(Error::validation_field(
                "diseaseType",
                "disease type must not be empty",
            ));
        }
        self.coordinates.validate()?;
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::validation_field(
                "confidence",
                format!("confidence {} is outside [0, 1]", self.confidence),
            ));
        }
        if self.report_count == 0 {
            return Err(Error::validation_field(
                "reportCount",
                "report count must be positive",
            ));
        }
        Ok(())
    }
}
