//! # fieldwatch-sync
//!
//! Keeps a local disease-report collection in step with the persistence
//! service and projects it into map zones.
//!
//! - [`Reconciler`]: fixed-interval fetch-and-replace
//! - [`OptimisticInserter`]: save, append, then force a reconciliation
//! - [`OutbreakMap`]: the component tying both to a [`ReportStore`] and a
//!   projection subscription
//!
//! ```rust,no_run
//! use fieldwatch_core::{Coordinates, DetectedDisease, InMemoryRepository};
//! use fieldwatch_sync::{OutbreakMap, SyncConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> fieldwatch_core::Result<()> {
//! let mut map = OutbreakMap::new(Arc::new(InMemoryRepository::new()), SyncConfig::default())?;
//! map.start();
//!
//! let detected = DetectedDisease::new("Late blight", 0.97)?;
//! map.report_detection(&detected, Coordinates::new(29.219577, 79.513203)?).await?;
//! assert_eq!(map.view().units.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! [`ReportStore`]: fieldwatch_core::ReportStore

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod insert;
pub mod lifecycle;
pub mod reconcile;

pub use config::{
    DEFAULT_FORCED_RECONCILE_DELAY, DEFAULT_RECONCILE_INTERVAL, DEFAULT_USER_ID, SyncConfig,
};
pub use engine::OutbreakMap;
pub use fieldwatch_core::{Error, Result};
pub use insert::OptimisticInserter;
pub use lifecycle::Lifecycle;
pub use reconcile::{ReconcileOutcome, Reconciler};
