//! Route handlers of the persistence resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use fieldwatch_core::{DeleteSummary, NewRecord, Record, ReportRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    /// Backing store.
    pub repo: Arc<dyn ReportRepository>,
    /// Service name reported by `/health`.
    pub service: String,
}

impl AppState {
    /// Creates state around a repository.
    pub fn new(repo: Arc<dyn ReportRepository>) -> Self {
        Self {
            repo,
            service: "fieldwatch-api".to_string(),
        }
    }
}

/// Health check response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"healthy"`, or `"degraded"` when the store cannot be read.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Number of stored records, when the store is readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
}

/// Builds the router with all routes mounted.
///
/// Mounts:
/// - `GET /`
/// - `GET /health`
/// - `GET|POST|DELETE /api/locations`
///
/// `POST /api/locations` answers `201 Created` with the stored record. A body
/// that is not a record, or one missing `userId`, `diseaseType` or
/// `location.coordinates`, answers `400 Bad Request` with
/// `{"error", "details"}` and the store is not touched.
/// A store failure answers `500`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/api/locations",
            get(list_locations)
                .post(create_location)
                .delete(clear_locations),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "Server is running"
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, record_count) = match state.repo.list().await {
        Ok(records) => ("healthy", Some(records.len())),
        Err(e) => {
            tracing::warn!("Health check could not read the store: {e}");
            ("degraded", None)
        }
    };
    Json(HealthResponse {
        status: status.to_string(),
        service: state.service.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        record_count,
    })
}

async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let records = state.repo.list().await.map_err(|e| ApiError::fetch(&e))?;
    tracing::debug!(count = records.len(), "Listed locations");
    Ok(Json(records))
}

/// Missing required fields are a client error (400), not a server one.
async fn create_location(
    State(state): State<AppState>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let Json(record) = payload.map_err(|e| ApiError::bad_payload(e.body_text()))?;
    let saved = state
        .repo
        .create(record)
        .await
        .map_err(|e| ApiError::save(&e))?;
    tracing::info!(id = ?saved.id, "Saved location");
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn clear_locations(
    State(state): State<AppState>,
) -> Result<Json<DeleteSummary>, ApiError> {
    let summary = state
        .repo
        .delete_all()
        .await
        .map_err(|e| ApiError::clear(&e))?;
    tracing::info!(deleted = summary.deleted_count, "Cleared locations");
    Ok(Json(summary))
}
