//! Wire records of the persistence service and their normalization.
//!
//! The persistence service stores loosely shaped documents. Everything that
//! comes back from it is decoded into [`Record`], whose fields are all
//! optional, and then normalized into a [`DiseaseReport`]. Records that cannot
//! be normalized are dropped here and never reach the aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ANONYMOUS_USER, Coordinates, DiseaseReport, ReportId};
use crate::{Error, Result};

/// Disease label used when a stored record has none.
pub const DEFAULT_DISEASE_TYPE: &str = "Disease";

/// Confidence assumed when a stored record has none.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Intensity assumed when a stored record has none.
pub const DEFAULT_INTENSITY: f64 = 0.5;

/// Detection method assumed when a stored record has none.
pub const DEFAULT_DETECTION_METHOD: &str = "PLANT_SCANNER";

/// GeoJSON geometry type of stored locations.
pub const POINT: &str = "Point";

fn point_kind() -> String {
    POINT.to_string()
}

/// A GeoJSON point. Coordinates are `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Geometry type, always `"Point"` for records written by Fieldwatch.
    #[serde(rename = "type", default = "point_kind")]
    pub kind: String,
    /// `[lng, lat]` position.
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    /// Builds a point from validated coordinates.
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            kind: point_kind(),
            coordinates: coordinates.to_lng_lat().to_vec(),
        }
    }
}

/// A stored record as returned by the persistence service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    /// Identifier assigned by the store.
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Reporter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Where the disease was seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Disease label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_type: Option<String>,
    /// Classifier confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Heat intensity, kept for older heat-layer consumers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    /// Number of observations the record stands for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_count: Option<i64>,
    /// Whether the record is a disease report (as opposed to a plain location).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disease_report: Option<bool>,
    /// Origin tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
    /// Seeded demo data marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_data: Option<bool>,
    /// Creation time stamped by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time stamped by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Client-side timestamp carried by some older records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Payload of a create call: a record without id and store timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRecord {
    /// Reporter (required by the store).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Location (required by the store).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Disease label (required by the store).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_type: Option<String>,
    /// Classifier confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Heat intensity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    /// Number of observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_count: Option<i64>,
    /// Disease report marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disease_report: Option<bool>,
    /// Origin tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
    /// Seeded demo data marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_data: Option<bool>,
}

impl NewRecord {
    /// Builds the create payload for a freshly detected disease.
    pub fn detection(
        user_id: impl Into<String>,
        coordinates: Coordinates,
        disease_type: impl Into<String>,
        confidence: f64,
        detection_method: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            location: Some(GeoPoint::from_coordinates(coordinates)),
            disease_type: Some(disease_type.into()),
            confidence: Some(confidence),
            intensity: Some(confidence),
            report_count: Some(1),
            is_disease_report: Some(true),
            detection_method: Some(detection_method.into()),
            test_data: None,
        }
    }

    /// Turns the payload into a stored record, applying store-side defaults.
    ///
    /// `userId`, `diseaseType` and `location.coordinates` are required, the
    /// rest default the way the persistence service's schema does.
    pub fn into_record(self, id: ReportId, now: DateTime<Utc>) -> Result<Record> {
        let user_id = required_text(self.user_id, "userId")?;
        let disease_type = required_text(self.disease_type, "diseaseType")?;
        let location = match self.location {
            Some(point) if !point.coordinates.is_empty() => GeoPoint {
                kind: point_kind(),
                coordinates: point.coordinates,
            },
            _ => {
                return Err(Error::validation_field(
                    "location.coordinates",
                    "location.coordinates is required",
                ));
            }
        };

        Ok(Record {
            id: Some(id.into_inner()),
            user_id: Some(user_id),
            location: Some(location),
            disease_type: Some(disease_type),
            confidence: Some(self.confidence.unwrap_or(DEFAULT_CONFIDENCE)),
            intensity: Some(self.intensity.unwrap_or(DEFAULT_INTENSITY)),
            report_count: Some(self.report_count.unwrap_or(1)),
            is_disease_report: Some(self.is_disease_report.unwrap_or(true)),
            detection_method: Some(
                self.detection_method
                    .unwrap_or_else(|| DEFAULT_DETECTION_METHOD.to_string()),
            ),
            test_data: Some(self.test_data.unwrap_or(false)),
            created_at: Some(now),
            updated_at: Some(now),
            timestamp: None,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(Error::validation_field(field, format!("{field} is required"))),
    }
}

/// Response of a delete-all call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    /// How many records were removed.
    pub deleted_count: u64,
}

impl Record {
    /// Returns `true` if the record describes a disease sighting.
    pub fn is_disease_report(&self) -> bool {
        self.is_disease_report == Some(true)
            || self
                .disease_type
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty())
    }

    /// Normalizes the record into a [`DiseaseReport`].
    ///
    /// `now` stamps records that carry no time at all.
    pub fn normalize(&self, now: DateTime<Utc>) -> Result<DiseaseReport> {
        let id = self.id.as_deref();

        if !self.is_disease_report() {
            return Err(Error::malformed(id, "not a disease report"));
        }

        let position = self
            .location
            .as_ref()
            .map(|point| point.coordinates.as_slice())
            .ok_or_else(|| Error::malformed(id, "missing location"))?;
        let coordinates = Coordinates::from_lng_lat(position)
            .map_err(|e| Error::malformed(id, format!("invalid coordinates: {e}")))?;

        let report_count = match self.report_count {
            None => 1,
            Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
            Some(n) => {
                return Err(Error::malformed(id, format!("report count {n} is not positive")));
            }
        };

        let confidence = self
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);

        let disease_type = self
            .disease_type
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DISEASE_TYPE)
            .to_string();

        let user_id = self
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(ANONYMOUS_USER)
            .to_string();

        let timestamp = self
            .created_at
            .or(self.timestamp)
            .or(self.updated_at)
            .unwrap_or(now);

        Ok(DiseaseReport {
            id: self.id.clone().map(ReportId::from),
            disease_type,
            coordinates,
            confidence,
            report_count,
            user_id,
            timestamp,
            detection_method: self.detection_method.clone(),
        })
    }
}

/// Result of normalizing a fetched batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    /// Reports that passed normalization, in source order.
    pub reports: Vec<DiseaseReport>,
    /// Number of records that were dropped.
    pub dropped: usize,
}

/// Normalizes a fetched batch, dropping records that do not qualify.
pub fn normalize_records(records: &[Record]) -> NormalizedBatch {
    let now = Utc::now();
    let mut batch = NormalizedBatch::default();
    for record in records {
        match record.normalize(now) {
            Ok(report) => batch.reports.push(report),
            Err(e) => {
                log::debug!("Dropping record: {e}");
                batch.dropped += 1;
            }
        }
    }
    batch
}

/// Decodes raw JSON documents one by one.
///
/// A document that does not decode is dropped and counted instead of failing
/// the whole response.
pub fn decode_records(values: Vec<Value>) -> (Vec<Record>, usize) {
    let mut records = Vec::with_capacity(values.len());
    let mut dropped = 0;
    for value in values {
        match serde_json::from_value::<Record>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::debug!("Dropping undecodable record: {e}");
                dropped += 1;
            }
        }
    }
    (records, dropped)
}
