//! # fieldwatch-api
//!
//! HTTP persistence resource for Fieldwatch disease reports.
//!
//! This crate serves the keyed-record store the sync engine talks to:
//! - `GET /api/locations` lists every stored record
//! - `POST /api/locations` stores one, applying schema defaults
//! - `DELETE /api/locations` removes all of them
//! - `GET /health` reports status and record count

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, Error, ErrorBody, Result};
pub use routes::{AppState, HealthResponse, router};
pub use server::{Server, ServerConfig};
