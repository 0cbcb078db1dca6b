//! Scoring tables: coverage tier sets, budget ceilings, and room keywords
//!
//! Built-in defaults mirror the comparison product's vocabulary. The same
//! tables can be loaded from CSV files in `data/tables/`.

pub mod loader;

use crate::error::TableError;
use crate::matching::{CoverageLevel, RoomType};
use std::collections::HashMap;
use std::path::Path;

pub use loader::DEFAULT_TABLES_PATH;

/// Weights and bounds of the match score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Added when the plan tier satisfies the desired coverage
    pub coverage: f64,
    /// Full budget term weight
    pub budget: f64,
    /// Added when the room descriptor matches
    pub room: f64,
    /// Premium/budget ratio at or above which the full budget weight applies
    pub budget_floor_ratio: f64,
    /// Upper (exclusive) bound of the random perturbation
    pub max_jitter: f64,
    /// Hard cap on the final score
    pub score_cap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            coverage: 0.4,
            budget: 0.3,
            room: 0.2,
            budget_floor_ratio: 0.7,
            max_jitter: 0.1,
            score_cap: 0.98,
        }
    }
}

/// A budget bucket and the premium ceiling it allows
///
/// The ceiling sits strictly above the nominal amount: it is a guardrail,
/// not the bucket's own value.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetCeiling {
    pub bucket: String,
    pub nominal: f64,
    pub ceiling: f64,
}

/// Lookup tables driving the match score
#[derive(Debug, Clone)]
pub struct ScoringTables {
    coverage_tiers: HashMap<CoverageLevel, Vec<String>>,
    budget_ceilings: Vec<BudgetCeiling>,
    room_keywords: HashMap<RoomType, Vec<String>>,
    pub weights: ScoringWeights,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ScoringTables {
    /// Build from explicit tables with default weights
    pub fn new(
        coverage_tiers: HashMap<CoverageLevel, Vec<String>>,
        budget_ceilings: Vec<BudgetCeiling>,
        room_keywords: HashMap<RoomType, Vec<String>>,
    ) -> Self {
        Self {
            coverage_tiers,
            budget_ceilings,
            room_keywords,
            weights: ScoringWeights::default(),
        }
    }

    /// Built-in tables
    pub fn default_tables() -> Self {
        let mut coverage_tiers = HashMap::new();
        coverage_tiers.insert(CoverageLevel::Basic, strings(&["Copper", "Bronze", "Basic", "Essential"]));
        coverage_tiers.insert(CoverageLevel::Standard, strings(&["Silver", "Standard", "Classic"]));
        coverage_tiers.insert(CoverageLevel::Enhanced, strings(&["Gold", "Enhanced", "Advantage"]));
        coverage_tiers.insert(CoverageLevel::Premium, strings(&["Diamond", "Premier"]));
        coverage_tiers.insert(CoverageLevel::Executive, strings(&["Platinum", "Executive"]));
        coverage_tiers.insert(CoverageLevel::Royal, strings(&["Royal", "Titanium", "Elite"]));

        // Bucket label, nominal amount, ceiling
        let budget_ceilings = [
            ("below-20k", 20_000.0, 25_000.0),
            ("20k-40k", 40_000.0, 50_000.0),
            ("40k-60k", 60_000.0, 75_000.0),
            ("60k-80k", 80_000.0, 100_000.0),
            ("80k-100k", 100_000.0, 125_000.0),
            ("100k-150k", 150_000.0, 180_000.0),
            ("above-150k", 250_000.0, 300_000.0),
        ]
        .iter()
        .map(|&(bucket, nominal, ceiling)| BudgetCeiling {
            bucket: bucket.to_string(),
            nominal,
            ceiling,
        })
        .collect();

        let mut room_keywords = HashMap::new();
        room_keywords.insert(RoomType::General, strings(&["General", "Ward", "Standard"]));
        room_keywords.insert(RoomType::Private, strings(&["Private"]));
        room_keywords.insert(RoomType::Deluxe, strings(&["Deluxe", "Executive"]));
        room_keywords.insert(RoomType::Ensuite, strings(&["Ensuite", "En-suite", "Suite"]));

        Self::new(coverage_tiers, budget_ceilings, room_keywords)
    }

    /// Load tables from CSV files in the default location (data/tables/)
    pub fn from_csv() -> Result<Self, TableError> {
        Self::from_csv_path(Path::new(DEFAULT_TABLES_PATH))
    }

    /// Load tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, TableError> {
        let loaded = loader::LoadedTables::load_from(path)?;
        Ok(Self::new(
            loaded.coverage_tiers,
            loaded.budget_ceilings,
            loaded.room_keywords,
        ))
    }

    /// Whether a plan tier label satisfies the desired coverage level
    pub fn tier_matches(&self, level: CoverageLevel, tier: &str) -> bool {
        let tier = tier.trim();
        self.coverage_tiers
            .get(&level)
            .map(|tiers| tiers.iter().any(|t| t == tier))
            .unwrap_or(false)
    }

    /// Premium ceiling for a budget bucket label
    pub fn max_budget(&self, bucket: &str) -> Option<f64> {
        let bucket = bucket.trim();
        self.budget_ceilings
            .iter()
            .find(|b| b.bucket.eq_ignore_ascii_case(bucket))
            .map(|b| b.ceiling)
    }

    pub fn budget_ceilings(&self) -> &[BudgetCeiling] {
        &self.budget_ceilings
    }

    /// Whether any keyword for the room type occurs in any descriptor.
    /// Matching is case sensitive.
    pub fn room_matches<'a, I>(&self, room_type: RoomType, descriptors: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(keywords) = self.room_keywords.get(&room_type) else {
            return false;
        };
        descriptors
            .into_iter()
            .any(|descriptor| keywords.iter().any(|kw| descriptor.contains(kw.as_str())))
    }
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self::default_tables()
    }
}
