//! # fieldwatch-client
//!
//! HTTP client for the Fieldwatch report persistence resource.
//!
//! [`HttpReportRepository`] implements
//! [`ReportRepository`](fieldwatch_core::ReportRepository) against
//! `GET|POST|DELETE {base}/api/locations`. Transport failures and non-success
//! statuses become `PersistenceUnavailable` for list and delete calls, and
//! `InsertRejected` for create calls.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpReportRepository;
pub use config::{ClientConfig, DEFAULT_BASE_URL, LOCATIONS_PATH};
pub use error::{Error, Result};
