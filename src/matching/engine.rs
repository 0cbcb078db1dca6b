//! Matching engine: filter, score, rank, truncate

use super::covers::{adjusted_premium, AdjustedPremium};
use super::filter::filter_by_budget;
use super::premium::{query_premium, resolve_premium, Premium};
use super::query::{ApplicantAge, UserQuery};
use super::ranker::{rank, MatchResult, ScoredPlan};
use super::report::MatchReport;
use super::scorer::{score_with_draw, JitterSource};
use crate::error::EngineError;
use crate::plan::{CatalogSnapshot, InsurancePlan, OptionalCover};
use crate::tables::ScoringTables;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Largest candidate set scored in one run by default
pub const DEFAULT_MAX_CANDIDATES: usize = 10_000;

/// Configuration for a matching run
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Keep only the top N results
    pub limit: Option<usize>,

    /// Drop plans whose cheapest premium exceeds the query's budget ceiling
    /// before scoring. Skipped when the budget bucket is unknown.
    pub prefilter_budget: bool,

    /// Reject runs with more candidates than this
    pub max_candidates: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limit: None,
            prefilter_budget: false,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Ranked matches for `query` over `catalog`
///
/// Jitter is drawn from `jitter` sequentially, one draw per candidate in
/// catalog order, before candidates are scored in parallel. A seeded source
/// therefore gives identical results on every run.
pub fn build_report<'a, J: JitterSource + ?Sized>(
    catalog: &'a CatalogSnapshot,
    query: &UserQuery,
    tables: &ScoringTables,
    config: &EngineConfig,
    jitter: &mut J,
) -> Result<Vec<MatchResult<'a>>, EngineError> {
    let budget_ceiling = query.budget.as_deref().and_then(|b| tables.max_budget(b));

    let candidates: Vec<&InsurancePlan> = match budget_ceiling {
        Some(max_budget) if config.prefilter_budget => filter_by_budget(catalog.plans(), max_budget),
        _ => catalog.plans().iter().collect(),
    };

    if candidates.len() > config.max_candidates {
        return Err(EngineError::CandidateLimitExceeded {
            candidates: candidates.len(),
            limit: config.max_candidates,
        });
    }

    log::debug!(
        "Scoring {} of {} catalog plans (prefilter: {})",
        candidates.len(),
        catalog.len(),
        config.prefilter_budget && budget_ceiling.is_some()
    );

    let draws: Vec<f64> = candidates.iter().map(|_| jitter.next_unit()).collect();

    let scored: Vec<ScoredPlan<'a>> = candidates
        .par_iter()
        .zip(draws.par_iter())
        .map(|(&plan, &draw)| ScoredPlan::new(plan, score_with_draw(plan, query, tables, draw)))
        .collect();

    let mut ranked = rank(scored);
    if let Some(limit) = config.limit {
        ranked.truncate(limit);
    }

    Ok(ranked)
}

/// Engine bundling scoring tables with run configuration
#[derive(Debug, Clone)]
pub struct MatchEngine {
    tables: ScoringTables,
    config: EngineConfig,
}

impl MatchEngine {
    /// Create a new engine with given tables and config
    pub fn new(tables: ScoringTables, config: EngineConfig) -> Self {
        Self { tables, config }
    }

    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranked matches for a query
    pub fn rank_plans<'a, J: JitterSource + ?Sized>(
        &self,
        catalog: &'a CatalogSnapshot,
        query: &UserQuery,
        jitter: &mut J,
    ) -> Result<Vec<MatchResult<'a>>, EngineError> {
        build_report(catalog, query, &self.tables, &self.config, jitter)
    }

    /// Ranked matches wrapped with display details
    pub fn report<J: JitterSource + ?Sized>(
        &self,
        catalog: &CatalogSnapshot,
        query: &UserQuery,
        jitter: &mut J,
    ) -> Result<MatchReport, EngineError> {
        let results = self.rank_plans(catalog, query, jitter)?;
        Ok(MatchReport::assemble(catalog, query, &results))
    }

    /// Plans passing the budget filter, in catalog order
    pub fn plans_within<'a>(&self, catalog: &'a CatalogSnapshot, max_budget: f64) -> Vec<&'a InsurancePlan> {
        filter_by_budget(catalog.plans(), max_budget)
    }

    /// Premium for one plan at an exact age
    pub fn premium(&self, catalog: &CatalogSnapshot, plan_id: &str, age: u8) -> Result<Premium, EngineError> {
        let plan = lookup(catalog, plan_id)?;
        Ok(resolve_premium(plan, age))
    }

    /// Premium for one plan including selected covers
    ///
    /// The base premium is resolved for `age` when given; otherwise the same
    /// first-band fallback as scoring applies. `None` means unpriceable.
    pub fn adjust(
        &self,
        catalog: &CatalogSnapshot,
        plan_id: &str,
        age: Option<u8>,
        selected: &BTreeSet<OptionalCover>,
    ) -> Result<Option<AdjustedPremium>, EngineError> {
        let plan = lookup(catalog, plan_id)?;
        let applicant = age.map(ApplicantAge::Exact).unwrap_or(ApplicantAge::Unspecified);
        Ok(query_premium(plan, applicant)
            .amount()
            .map(|base| adjusted_premium(plan, base, selected)))
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(ScoringTables::default_tables(), EngineConfig::default())
    }
}

fn lookup<'a>(catalog: &'a CatalogSnapshot, plan_id: &str) -> Result<&'a InsurancePlan, EngineError> {
    catalog
        .plan(plan_id)
        .ok_or_else(|| EngineError::UnknownPlan(plan_id.to_string()))
}
