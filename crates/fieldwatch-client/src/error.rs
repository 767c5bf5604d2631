//! Error types for fieldwatch-client

use thiserror::Error;

/// Result type alias for fieldwatch-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldwatch-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from fieldwatch-core
    #[error("Core error: {0}")]
    Core(#[from] fieldwatch_core::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The resource answered with a non-success status
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        /// Request method
        method: &'static str,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Invalid base URL or client settings
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// Maps a client failure into the core persistence error.
    pub fn into_persistence(self) -> fieldwatch_core::Error {
        match self {
            Error::Core(inner) => inner,
            other => fieldwatch_core::Error::persistence_with_source(other.to_string(), other),
        }
    }

    /// Maps a failed create call into the core insert-rejected error.
    pub fn into_insert_rejected(self) -> fieldwatch_core::Error {
        self.into_persistence().into_insert_rejected()
    }
}

impl From<Error> for fieldwatch_core::Error {
    fn from(err: Error) -> Self {
        err.into_persistence()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = Error::Status {
            method: "GET",
            url: "http://localhost:8000/api/locations".into(),
            status: 500,
            body: r#"{"error":"Failed to fetch locations"}"#.into(),
        };
        assert!(err.to_string().starts_with("GET http://localhost:8000/api/locations returned 500"));
    }

    #[test]
    fn test_maps_to_persistence_unavailable() {
        let err: fieldwatch_core::Error = Error::Config("bad".into()).into();
        assert!(matches!(
            err,
            fieldwatch_core::Error::PersistenceUnavailable { .. }
        ));
        assert!(err.is_transient());
    }

    #[test]
    fn test_core_errors_pass_through() {
        let core = fieldwatch_core::Error::validation("missing id");
        let err = Error::from(core).into_persistence();
        assert!(matches!(err, fieldwatch_core::Error::Validation { .. }));
    }

    #[test]
    fn test_create_failures_become_insert_rejected() {
        let err = Error::Status {
            method: "POST",
            url: "u".into(),
            status: 400,
            body: String::new(),
        }
        .into_insert_rejected();
        assert!(matches!(err, fieldwatch_core::Error::InsertRejected { .. }));
    }
}
