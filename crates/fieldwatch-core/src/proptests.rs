//! Property-based tests for clustering and severity.
