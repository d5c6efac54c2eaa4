//! Med-Alt Core Library
//!
//! Medicine directory search: find medicines by brand name or composition and,
//! for each match, list other medicines with exactly the same composition.
//!
//! # Architecture
//!
//! ```text
//! searchTerm ─▶ validate ─▶ acquire connection (StorePool)
//!                                   │
//!                           primary search (≤5)
//!                 brand LIKE %term%  OR  composition FTS5 match
//!                                   │
//!                 ┌─────────────────┼─────────────────┐
//!                 ▼                 ▼                 ▼
//!           alternatives      alternatives      alternatives   (≤5 each,
//!          (= composition)   (= composition)   (= composition)  same connection)
//!                 └─────────────────┼─────────────────┘
//!                                   ▼
//!                            Vec<SearchResult>
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite schema, queries, and the r2d2 connection pool
//! - [`models`]: Domain types (MedicineRecord, SearchResult, AlternativeResult)
//! - [`search`]: Term validation and the two-stage search handler

pub mod db;
pub mod models;
pub mod search;

// Re-export commonly used types
pub use db::{Database, DbError, MedicineStore, StoreConfig, StorePool, StoreSource};
pub use models::{AlternativeResult, MedicineRecord, SearchResult};
pub use search::{SearchError, SearchService};
