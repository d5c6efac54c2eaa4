//! HTTP handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use med_alt_core::search::validate_term;
use med_alt_core::SearchResult;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

/// Query string of `GET /api/med-alt/query`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search_term: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Search medicines by name or composition and attach alternatives.
///
/// Blank terms are rejected before any connection is requested. The search
/// itself runs on the blocking pool since SQLite calls block.
pub async fn query_medicines(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    validate_term(params.search_term.as_deref())?;

    let permit = match &state.admission {
        Some(semaphore) => Some(
            semaphore
                .clone()
                .try_acquire_owned()
                .map_err(|_| ApiError::Overloaded)?,
        ),
        None => None,
    };

    let service = state.service.clone();
    let results = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        service.search(params.search_term.as_deref())
    })
    .await??;

    Ok(Json(results))
}

/// Liveness plus a database round trip.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthRes>) {
    let service = state.service.clone();
    let ping = tokio::task::spawn_blocking(move || service.source().ping()).await;

    let reachable = match ping {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "health check could not reach the database");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check worker failed");
            false
        }
    };

    if reachable {
        (
            StatusCode::OK,
            Json(HealthRes {
                ok: true,
                message: "med-alt is alive".into(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthRes {
                ok: false,
                message: "database unavailable".into(),
            }),
        )
    }
}
