//! Fieldwatch Core: report types, clustering, severity and projection.
//!
//! This crate has no internal Fieldwatch dependencies. Everything in it is
//! synchronous except the collaborator traits and the status handle.
//!
//! # Modules
//!
//! - [`types`]: reports, coordinates and wire records
//! - [`quantize`]: coordinate quantization into cluster keys
//! - [`severity`]: tier, color and radius of a cluster
//! - [`cluster`]: single-pass aggregation by cluster key
//! - [`projection`]: renderer-agnostic map units
//! - [`store`]: the shared local collection
//! - [`status`]: sync status handle
//! - [`repository`]: persistence collaborator trait
//! - [`detection`]: classifier gate
//! - [`location`]: position acquisition

#![doc = include_str!("../README.md")]

pub mod cluster;
pub mod detection;
pub mod error;
pub mod location;
pub mod projection;
pub mod quantize;
pub mod repository;
pub mod severity;
pub mod status;
pub mod store;
pub mod types;

mod proptests;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};

pub use cluster::{AggregateStats, ClusterAggregate, ClusterMap, aggregate};
pub use detection::{
    Classification, DEFAULT_MIN_CONFIDENCE, DetectedDisease, DetectionGate, disease_label,
    is_healthy,
};
pub use location::{FixedLocation, LocationProvider, LocationRequest, acquire};
pub use projection::{
    ClusterSummary, DetailLine, MapView, RenderableUnit, ViewStats, project, project_all,
};
pub use quantize::{CLUSTER_PRECISION, ClusterKey, quantize};
pub use repository::{InMemoryRepository, ReportRepository};
pub use severity::{Severity, SeverityColor, SeverityTier, severity};
pub use status::{SyncState, SyncStatus};
pub use store::{ReportSnapshot, ReportStore};
pub use types::{
    ANONYMOUS_USER, Coordinates, DeleteSummary, DiseaseReport, GeoPoint, NewRecord,
    NormalizedBatch, Record, ReportId, decode_records, normalize_records,
};
