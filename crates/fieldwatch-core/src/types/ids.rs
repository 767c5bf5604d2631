//! Identifier types for reports and reporters.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User id recorded when a report carries no reporter.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Opaque identifier of a persisted report.
///
/// Assigned by the persistence service; the client never invents one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Creates a report ID from a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use fieldwatch_core::ReportId;
    ///
    /// let id = ReportId::new("66f1c0ffee");
    /// assert_eq!(id.as_str(), "66f1c0ffee");
    /// ```
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random ID (used by in-memory stores).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts into the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReportId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReportId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
