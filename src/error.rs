use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to the climate archive or the elevation service.
#[derive(Debug, Error)]
pub enum ClimateError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned an unusable response: {reason}")]
    BadResponse {
        service: &'static str,
        reason: String,
    },

    #[error("climate archive returned no daily data")]
    EmptySeries,

    #[error("unparsable date {0:?} in climate series")]
    BadDate(String),
}

/// Errors surfaced to HTTP callers. The body carries a `detail` string.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("upstream data source failed: {0}")]
    Upstream(#[from] ClimateError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Upstream(e) => tracing::error!(error = %e, "upstream failure"),
            ApiError::Validation(msg) => tracing::debug!(%msg, "rejected request"),
        }
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
