//! Error types for fieldwatch-cli

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for fieldwatch-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldwatch-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from fieldwatch-core
    #[error("Core error: {0}")]
    Core(#[from] fieldwatch_core::Error),

    /// Error from fieldwatch-client
    #[error("Client error: {0}")]
    Client(#[from] fieldwatch_client::Error),

    /// Error from fieldwatch-api
    #[error("Server error: {0}")]
    Api(#[from] fieldwatch_api::Error),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File access failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Output could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Process exit status for failures worth retrying later (`EX_TEMPFAIL`).
pub const EXIT_TEMPFAIL: u8 = 75;

impl Error {
    /// Returns whether retrying the same command later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Core(e) => e.is_transient(),
            Error::Client(fieldwatch_client::Error::Core(e)) => e.is_transient(),
            Error::Client(fieldwatch_client::Error::Config(_)) => false,
            Error::Client(_) => true,
            _ => false,
        }
    }

    /// Exit status of the process when a command fails with this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_transient() { EXIT_TEMPFAIL } else { 1 }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
