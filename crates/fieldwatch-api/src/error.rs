//! Error types for fieldwatch-api

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fieldwatch-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from fieldwatch-core
    #[error("Core error: {0}")]
    Core(#[from] fieldwatch_core::Error),

    /// Binding or serving failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON body of every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short description of the failed operation.
    pub error: String,
    /// Underlying cause, for rejected payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A failed request, rendered as status plus [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Fetching the collection failed.
    pub fn fetch(err: &fieldwatch_core::Error) -> Self {
        tracing::error!("Error fetching locations: {err}");
        Self::internal("Failed to fetch locations", None)
    }

    /// Saving a record failed; validation failures are the caller's fault.
    pub fn save(err: &fieldwatch_core::Error) -> Self {
        match err {
            fieldwatch_core::Error::Validation { message, .. } => {
                tracing::warn!("Rejected location: {message}");
                Self {
                    status: StatusCode::BAD_REQUEST,
                    body: ErrorBody {
                        error: "Failed to save location".to_string(),
                        details: Some(message.clone()),
                    },
                }
            }
            other => {
                tracing::error!("Error saving location: {other}");
                Self::internal("Failed to save location", Some(other.to_string()))
            }
        }
    }

    /// The request body was not a record.
    pub fn bad_payload(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "Failed to save location".to_string(),
                details: Some(details.into()),
            },
        }
    }

    /// Clearing the collection failed.
    pub fn clear(err: &fieldwatch_core::Error) -> Self {
        tracing::error!("Error clearing locations: {err}");
        Self::internal("Failed to clear locations", None)
    }

    fn internal(error: &str, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: error.to_string(),
                details,
            },
        }
    }

    /// Status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
