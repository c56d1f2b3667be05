//! Per-request scan identifiers.
//!
//! Every scan gets a `ScanId`; it tags the tracing span of the request and
//! is echoed back as `scanId` so client reports can be matched to server logs.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// A unique identifier for a scan request (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScanId(Uuid);

impl ScanId {
    /// Generate a new random scan ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get a short representation (first 8 characters).
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
