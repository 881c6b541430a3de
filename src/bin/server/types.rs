//! Request and response types for the HTTP API
//!
//! The HTTP layer owns parameter parsing and serialization only; all logic
//! lives in the library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartlog_analytics::models::{HistogramRow, LogFrequencyEntry};

// =============================================================================
// Request Types
// =============================================================================

/// Time window parameters shared by the overview and filter endpoints
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    /// Window start (inclusive)
    pub start: DateTime<Utc>,
    /// Window end (inclusive)
    pub end: DateTime<Utc>,
}

/// Frequency analysis request
#[derive(Debug, Deserialize)]
pub struct FrequencyParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub selected_subunits: Vec<i64>,
}

/// Time chart request
#[derive(Debug, Deserialize)]
pub struct TimeChartParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub selected_subunits: Vec<i64>,
    pub selected_codes: Vec<String>,
}

/// Firmware chart request
#[derive(Debug, Deserialize)]
pub struct FirmwareChartParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub selected_firmwares: Vec<String>,
    pub selected_codes: Vec<String>,
}

/// Log file deletion request
#[derive(Debug, Deserialize)]
pub struct LogDeleteRequest {
    /// File name whose entries should be removed
    pub log: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Entry count response for uploads and deletions
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Frequency analysis response
#[derive(Debug, Serialize)]
pub struct FrequencyResponse {
    pub entries: Vec<LogFrequencyEntry>,
}

/// Histogram response shared by the time and firmware charts
#[derive(Debug, Serialize)]
pub struct HistogramResponse {
    pub bars: Vec<HistogramRow>,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
