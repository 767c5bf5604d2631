//! Core data types for disease reports.

mod coordinates;
mod ids;
mod record;
mod report;

pub use coordinates::{Coordinates, LAT_RANGE, LNG_RANGE};
pub use ids::{ANONYMOUS_USER, ReportId};
pub use record::{
    DEFAULT_CONFIDENCE, DEFAULT_DETECTION_METHOD, DEFAULT_DISEASE_TYPE, DEFAULT_INTENSITY,
    DeleteSummary, GeoPoint, NewRecord, NormalizedBatch, POINT, Record, decode_records,
    normalize_records,
};
pub use report::DiseaseReport;
