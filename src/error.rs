//! Error types for catalog loading, table loading and engine runs
//!
//! An unpriceable premium is not an error: see [`crate::matching::Premium`].

use thiserror::Error;

/// Failure to interpret a single age-range descriptor or its premium
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgeRangeError {
    #[error("invalid age range descriptor: {0:?}")]
    InvalidDescriptor(String),

    #[error("age range {descriptor:?} has lower bound above upper bound")]
    Inverted { descriptor: String },

    #[error("premium for age range {descriptor:?} is not a non-negative amount: {premium}")]
    InvalidPremium { descriptor: String, premium: f64 },

    #[error("age range table is not a mapping of descriptor to amount: {0}")]
    NotAMapping(String),
}

/// Failure to load the plan catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("catalog entry {index} ({plan_id}) rejected: {reason}")]
    InvalidEntry {
        index: usize,
        plan_id: String,
        reason: String,
    },
}

/// Failure to load scoring tables
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse table {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid value in table {file}: {reason}")]
    InvalidValue { file: String, reason: String },
}

/// Failure of an engine call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("candidate set of {candidates} plans exceeds limit of {limit}")]
    CandidateLimitExceeded { candidates: usize, limit: usize },

    #[error("unknown plan: {0}")]
    UnknownPlan(String),
}
