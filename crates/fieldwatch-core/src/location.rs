//! Acquiring the reporter's own position.

use async_trait::async_trait;
use std::time::Duration;

use crate::types::Coordinates;
use crate::{Error, Result};

/// Options passed to a [`LocationProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    /// Ask for the most accurate fix available.
    pub high_accuracy: bool,
    /// Upper bound on the wait for a fix.
    pub timeout: Duration,
    /// Oldest cached fix that is still acceptable.
    pub maximum_age: Duration,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

/// Source of the device position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Returns the current position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocationUnavailable`] when the position is denied or
    /// cannot be determined.
    async fn current_position(&self, request: &LocationRequest) -> Result<Coordinates>;
}

/// Asks a provider for a position with a bounded wait.
///
/// Denial, provider errors, invalid fixes and timeouts all come back as
/// [`Error::LocationUnavailable`].
pub async fn acquire(
    provider: &dyn LocationProvider,
    request: &LocationRequest,
) -> Result<Coordinates> {
    let position = tokio::time::timeout(request.timeout, provider.current_position(request))
        .await
        .map_err(|_| {
            Error::location_unavailable(format!(
                "no position within {}ms",
                request.timeout.as_millis()
            ))
        })?;

    let coordinates = position.map_err(|e| match e {
        Error::LocationUnavailable { .. } => e,
        other => Error::location_unavailable(other.to_string()),
    })?;

    coordinates
        .validate()
        .map_err(|e| Error::location_unavailable(format!("invalid fix: {e}")))?;
    Ok(coordinates)
}

/// Provider returning a configured position, or denying when there is none.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedLocation(pub Option<Coordinates>);

impl FixedLocation {
    /// Always answers with `coordinates`.
    pub fn at(coordinates: Coordinates) -> Self {
        Self(Some(coordinates))
    }

    /// Always denies.
    pub fn denied() -> Self {
        Self(None)
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self, _request: &LocationRequest) -> Result<Coordinates> {
        self.0
            .ok_or_else(|| Error::location_unavailable("permission denied"))
    }
}
