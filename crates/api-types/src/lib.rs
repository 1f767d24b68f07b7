//! Shared request/response types used by API-facing crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success envelope: `{ "data": ..., "code": 200 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub code: u16,
}

impl<T> SuccessResponse<T> {
    #[must_use]
    pub fn new(code: u16, data: T) -> Self {
        Self {
            data,
            message: None,
            code,
        }
    }
}

/// Error envelope: `{ "error": ..., "message": ..., "code": 404 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Underlying error text; empty when there is none.
    #[serde(default)]
    pub error: String,
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn healthy(service: &str, version: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatePathRequest {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatePathResponse {
    pub path: String,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResponse<T> {
    pub path: String,
    pub files: Vec<T>,
    pub count: usize,
}

impl<T> ListingResponse<T> {
    #[must_use]
    pub fn new(path: String, files: Vec<T>) -> Self {
        let count = files.len();
        Self { path, files, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    pub path: String,
    pub query: String,
    pub results: Vec<T>,
    pub count: usize,
}

impl<T> SearchResponse<T> {
    #[must_use]
    pub fn new(path: String, query: String, results: Vec<T>) -> Self {
        let count = results.len();
        Self {
            path,
            query,
            results,
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootsResponse {
    pub roots: Vec<String>,
    pub count: usize,
}

impl RootsResponse {
    #[must_use]
    pub fn new(roots: Vec<String>) -> Self {
        let count = roots.len();
        Self { roots, count }
    }
}
