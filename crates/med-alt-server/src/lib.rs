//! # Med-Alt Server
//!
//! HTTP surface for the medicine alternatives search.
//!
//! Handles:
//! - `GET /api/med-alt/query?searchTerm=...` with axum
//! - `GET /health` for monitoring and load balancers
//! - Environment configuration and the shared connection pool
//!
//! Uses `med-alt-core` for the store and the search itself.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use med_alt_core::{SearchService, StorePool};
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;

/// Application state shared across request handlers.
///
/// Holds the process-wide search service (and through it the connection pool)
/// plus an optional admission limit on searches in flight.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchService<StorePool>>,
    pub admission: Option<Arc<Semaphore>>,
}

impl AppState {
    /// `max_in_flight` of `None` lets every search wait for a connection.
    pub fn new(pool: StorePool, max_in_flight: Option<usize>) -> Self {
        Self {
            service: Arc::new(SearchService::new(pool)),
            admission: max_in_flight.map(|permits| Arc::new(Semaphore::new(permits))),
        }
    }
}

/// Build the REST router.
pub fn router(state: AppState) -> Router {
    let med_alt = Router::new().route("/query", get(routes::query_medicines));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api/med-alt", med_alt)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
