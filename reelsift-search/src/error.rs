//! Error types for reelsift-search
//!
//! [`DiscoverError`] is the pipeline taxonomy; [`ApiError`] maps it onto HTTP responses.

use crate::clients::CatalogError;
use crate::enrichment::EnrichmentFailure;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reelsift_common::events::FailureKind;
use serde_json::json;
use thiserror::Error;

/// Pipeline error taxonomy
#[derive(Debug, Clone, Error)]
pub enum DiscoverError {
    /// Catalog search failed; no automatic retry
    #[error("Search unavailable: {0}")]
    SearchUnavailable(#[from] CatalogError),

    /// One or more metadata lookups failed under the all-or-nothing policy
    #[error("Enrichment failed for {} of the results", failures.len())]
    EnrichmentFailed { failures: Vec<EnrichmentFailure> },

    /// Clustering emission refused; the caller should prompt the user
    #[error("Please enter K more than 2 (got {k})")]
    ValidationRefused { k: i64 },

    /// Selection requested for a movie that is not in the displayed results
    #[error("Movie not in current results: {0}")]
    NotInResults(String),
}

impl DiscoverError {
    /// Classification for search-cycle failures, `None` for user-input errors
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            DiscoverError::SearchUnavailable(_) => Some(FailureKind::SearchUnavailable),
            DiscoverError::EnrichmentFailed { .. } => Some(FailureKind::EnrichmentFailed),
            _ => None,
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Pipeline error
    #[error(transparent)]
    Discover(#[from] DiscoverError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Discover(err) => {
                let (status, code) = match &err {
                    DiscoverError::SearchUnavailable(_) => {
                        (StatusCode::BAD_GATEWAY, "SEARCH_UNAVAILABLE")
                    }
                    DiscoverError::EnrichmentFailed { .. } => {
                        (StatusCode::BAD_GATEWAY, "ENRICHMENT_FAILED")
                    }
                    DiscoverError::ValidationRefused { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_REFUSED")
                    }
                    DiscoverError::NotInResults(_) => (StatusCode::NOT_FOUND, "NOT_IN_RESULTS"),
                };
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
