//! Mapping of search failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use med_alt_core::SearchError;
use serde::Serialize;
use thiserror::Error;

/// Body returned when fetching from the store fails, whatever the cause.
pub const STORE_FAILURE_MESSAGE: &str = "Failed to fetch medicine data. Please try again later.";

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Too many searches waiting for a database connection")]
    Overloaded,

    #[error("Search worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// JSON error body: `{ "message": ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Search(SearchError::Validation) => {
                (StatusCode::BAD_REQUEST, SearchError::Validation.to_string())
            }
            ApiError::Search(SearchError::StoreUnavailable(_))
            | ApiError::Overloaded
            | ApiError::Worker(_) => {
                tracing::error!(error = %self, "Error fetching medicine alternatives");
                (StatusCode::INTERNAL_SERVER_ERROR, STORE_FAILURE_MESSAGE.to_string())
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
