//! Medicine search with same-composition alternatives.
//!
//! Pipeline: Validate term → Primary search → Alternative lookup per match

use thiserror::Error;

use crate::db::{DbError, MedicineStore, StoreSource};
use crate::models::{AlternativeResult, SearchResult};

/// Maximum number of primary matches returned.
pub const PRIMARY_RESULTS_LIMIT: usize = 5;

/// Maximum number of alternatives per primary match.
pub const ALTERNATIVES_LIMIT: usize = 5;

/// Search errors.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search term is required.")]
    Validation,

    #[error("Medicine store unavailable: {0}")]
    StoreUnavailable(#[from] DbError),
}

/// Trim the raw term and reject it when nothing is left.
pub fn validate_term(raw: Option<&str>) -> Result<&str, SearchError> {
    match raw.map(str::trim) {
        Some(term) if !term.is_empty() => Ok(term),
        _ => Err(SearchError::Validation),
    }
}

/// Run the primary search and attach alternatives to each match.
///
/// Any store failure aborts the whole search; no partial list is returned.
pub fn search_with_alternatives<S>(store: &S, term: &str) -> Result<Vec<SearchResult>, SearchError>
where
    S: MedicineStore + ?Sized,
{
    let primaries = store.primary_matches(term, PRIMARY_RESULTS_LIMIT)?;

    let mut results = Vec::with_capacity(primaries.len());
    for primary in primaries {
        let alternatives = match primary.composition_key() {
            Some(composition) => store
                .alternatives_for(composition, primary.id, ALTERNATIVES_LIMIT)?
                .into_iter()
                .map(AlternativeResult::from)
                .collect(),
            None => Vec::new(),
        };
        results.push(SearchResult::from_primary(primary, alternatives));
    }

    Ok(results)
}

/// Request-level entry point: validation, then one store handle per search.
pub struct SearchService<P> {
    source: P,
}

impl<P: StoreSource> SearchService<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }

    /// Search by brand name or composition.
    ///
    /// The term is validated before a connection is taken. The connection is
    /// held for the primary query and every alternatives query, then returned
    /// to its source when this call ends, whatever the outcome.
    pub fn search(&self, raw_term: Option<&str>) -> Result<Vec<SearchResult>, SearchError> {
        let term = validate_term(raw_term)?;
        let store = self.source.acquire()?;
        let results = search_with_alternatives(&store, term)?;
        tracing::debug!(term, count = results.len(), "medicine search complete");
        Ok(results)
    }

    /// The underlying store source.
    pub fn source(&self) -> &P {
        &self.source
    }
}
