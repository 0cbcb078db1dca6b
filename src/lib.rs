//! Plan Matcher - Premium resolution and plan ranking for health insurance comparison
//!
//! This library provides:
//! - Age-bracketed and fixed premium resolution
//! - Budget filtering of the plan catalog
//! - Weighted match scoring against a user query
//! - Stable ranking and optional cover pricing
//! - A transport-neutral API surface for the comparison flow

pub mod api;
pub mod error;
pub mod matching;
pub mod plan;
pub mod tables;

// Re-export commonly used types
pub use error::{AgeRangeError, CatalogError, EngineError, TableError};
pub use matching::{EngineConfig, MatchEngine, MatchReport, MatchResult, Premium, UserQuery};
pub use plan::{AgeRangeTable, CatalogSnapshot, InsurancePlan, PremiumStructure};
pub use tables::ScoringTables;
