//! HTTP endpoint handlers
//!
//! Each handler validates parameters, delegates to [`LogDatabase`], and
//! serializes the typed result. Domain conditions (duplicate upload, parse
//! rejection, invalid windows) map to 400; store faults map to 502.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use smartlog_analytics::{Error, LogDatabase, LogFile, TimeWindow};

use super::types::*;

/// Shared application state
pub struct AppState {
    /// The log database handle
    pub db: LogDatabase,
}

/// Error wrapper translating library errors into HTTP responses
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::DuplicateUpload { .. } | Error::Parse(_) | Error::Configuration(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Store(_) => StatusCode::BAD_GATEWAY,
            Error::NotBootstrapped => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            errors: vec![self.0.to_string()],
        };
        (status, Json(body)).into_response()
    }
}

fn window(start: chrono::DateTime<chrono::Utc>, end: chrono::DateTime<chrono::Utc>) -> Result<TimeWindow, ApiError> {
    Ok(TimeWindow::new(start, end)?)
}

// =============================================================================
// Health
// =============================================================================

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Log file management
// =============================================================================

/// Upload a parsed log file
pub async fn upload_log(
    State(state): State<Arc<AppState>>,
    Json(log_file): Json<LogFile>,
) -> Result<Json<CountResponse>, ApiError> {
    if log_file.filename.is_empty() {
        return Err(Error::Parse("missing log file name".to_string()).into());
    }
    let count = state.db.upload(&log_file).await?;
    Ok(Json(CountResponse { count }))
}

/// List stored log files with their timestamp bounds
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.stored_files().await?))
}

/// Delete a stored log file by name
pub async fn delete_log(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogDeleteRequest>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.db.delete(&request.log).await?;
    Ok(Json(CountResponse { count }))
}

// =============================================================================
// Log aggregation analysis
// =============================================================================

/// Overview statistics for a time window
pub async fn log_overview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, ApiError> {
    let window = window(params.start, params.end)?;
    Ok(Json(state.db.overview(window).await?))
}

/// Event-frequency breakdown by firmware and code
pub async fn log_frequency(
    State(state): State<Arc<AppState>>,
    Json(params): Json<FrequencyParams>,
) -> Result<Json<FrequencyResponse>, ApiError> {
    let window = window(params.start, params.end)?;
    let entries = state
        .db
        .frequency(window, &params.selected_subunits)
        .await?;
    Ok(Json(FrequencyResponse { entries }))
}

// =============================================================================
// Charts
// =============================================================================

/// Distinct filter values for the chart controls
pub async fn chart_filters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, ApiError> {
    let window = window(params.start, params.end)?;
    Ok(Json(state.db.chart_filters(window).await?))
}

/// Event counts over auto-sized time buckets
pub async fn time_chart(
    State(state): State<Arc<AppState>>,
    Json(params): Json<TimeChartParams>,
) -> Result<Json<HistogramResponse>, ApiError> {
    let window = window(params.start, params.end)?;
    let bars = state
        .db
        .time_histogram(window, &params.selected_subunits, &params.selected_codes)
        .await?;
    Ok(Json(HistogramResponse { bars }))
}

/// Event counts grouped by firmware
pub async fn firmware_chart(
    State(state): State<Arc<AppState>>,
    Json(params): Json<FirmwareChartParams>,
) -> Result<Json<HistogramResponse>, ApiError> {
    let window = window(params.start, params.end)?;
    let bars = state
        .db
        .firmware_histogram(window, &params.selected_firmwares, &params.selected_codes)
        .await?;
    Ok(Json(HistogramResponse { bars }))
}
