//! # Recommendation Module
//!
//! Multi-strategy candidate generation and ranking. Given a handful of seed
//! tracks, the engine searches the catalog through independent discovery
//! strategies, merges and deduplicates what comes back, drops tracks the
//! caller already knows and returns a ranked shortlist.
//!
//! ```text
//! caller ─► RecommendationEngine
//!              ├─ seeds::select_seeds
//!              ├─ strategy::StrategyRunner ─► CatalogService (artist / genre / keyword)
//!              │                           └► ProfileStore (user-based mode)
//!              ├─ aggregate::aggregate
//!              └─ score::Scorer::rank
//! ```
//!
//! Collaborators are injected as trait objects (see [`ports`]); the engine does
//! not reach for global state and does not cache.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod ports;
pub mod score;
pub mod seeds;
pub mod strategy;

pub use engine::{MAX_LIMIT, RecommendationEngine};
pub use error::{CatalogError, ProfileError, RecommendationError};
pub use ports::{CatalogService, ProfileStore};
pub use score::{FixedRandom, RandomSource, ScoringConfig, SeededRandom, ThreadRandom};
