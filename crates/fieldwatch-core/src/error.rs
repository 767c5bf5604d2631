//! Error types for the Fieldwatch core library.

/// Errors that can occur while collecting, syncing or clustering reports.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Geolocation was denied, failed, or timed out.
    #[error("Location unavailable: {reason}")]
    LocationUnavailable {
        /// Why no position could be obtained
        reason: String,
    },

    /// A fetch, save or delete call against the persistence service failed.
    #[error("Persistence unavailable: {message}")]
    PersistenceUnavailable {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A fetched record could not be turned into a disease report.
    ///
    /// Only produced at the record boundary; dropped records never reach
    /// the aggregator and this error is never surfaced to callers.
    #[error("Malformed record{}: {reason}", id.as_deref().map(|id| format!(" {id}")).unwrap_or_default())]
    MalformedRecord {
        /// Record identifier, when the record carried one
        id: Option<String>,
        /// What was wrong with it
        reason: String,
    },

    /// Saving a freshly detected report failed; nothing was added locally.
    #[error("Insert rejected: {message}")]
    InsertRejected {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller-supplied input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// An operation did not finish in time
    #[error("{operation} timed out after {millis}ms")]
    Timeout {
        /// What was being waited on
        operation: String,
        /// Timeout duration in milliseconds
        millis: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

/// Convenience `Result` type alias for Fieldwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is transient.
    ///
    /// Transient errors are worth surfacing as a status and trying again on
    /// the next scheduled attempt; the rest are permanent for the given input.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::LocationUnavailable { .. } => true,
            Error::PersistenceUnavailable { .. } => true,
            Error::InsertRejected { .. } => true,
            Error::Timeout { .. } => true,
            Error::MalformedRecord { .. } => false,
            Error::Validation { .. } => false,
            Error::Config { .. } => false,
        }
    }

    /// Creates a new location-unavailable error.
    pub fn location_unavailable<S: Into<String>>(reason: S) -> Self {
        Error::LocationUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new persistence error with a message.
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Error::PersistenceUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new persistence error with a message and source error.
    pub fn persistence_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::PersistenceUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new malformed-record error.
    pub fn malformed<S: Into<String>>(id: Option<&str>, reason: S) -> Self {
        Error::MalformedRecord {
            id: id.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Creates a new insert-rejected error.
    pub fn insert_rejected<S: Into<String>>(message: S) -> Self {
        Error::InsertRejected {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new insert-rejected error with a message and source error.
    pub fn insert_rejected_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::InsertRejected {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Re-labels any failure of a save call as [`Error::InsertRejected`].
    ///
    /// Errors that already are insert rejections pass through unchanged.
    pub fn into_insert_rejected(self) -> Self {
        match self {
            Error::InsertRejected { .. } => self,
            Error::PersistenceUnavailable { message, source } => {
                Error::InsertRejected { message, source }
            }
            other => Error::InsertRejected {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout<S: Into<String>>(operation: S, after: std::time::Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            millis: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
