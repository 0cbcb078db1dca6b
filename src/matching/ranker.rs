//! Ranking of scored plans

use super::scorer::ScoreBreakdown;
use crate::plan::InsurancePlan;
use serde::{Serialize, Serializer};

/// A plan paired with its score, before ranking
#[derive(Debug, Clone, Copy)]
pub struct ScoredPlan<'a> {
    pub plan: &'a InsurancePlan,
    pub breakdown: ScoreBreakdown,
}

impl<'a> ScoredPlan<'a> {
    pub fn new(plan: &'a InsurancePlan, breakdown: ScoreBreakdown) -> Self {
        Self { plan, breakdown }
    }

    /// Scored plan carrying only a total
    pub fn with_total(plan: &'a InsurancePlan, total: f64) -> Self {
        Self::new(
            plan,
            ScoreBreakdown {
                total,
                ..Default::default()
            },
        )
    }

    pub fn score(&self) -> f64 {
        self.breakdown.total
    }
}

fn serialize_plan_id<S: Serializer>(plan: &&InsurancePlan, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&plan.id)
}

/// Ranked output for one plan; never mutated after ranking
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult<'a> {
    #[serde(rename = "planId", serialize_with = "serialize_plan_id")]
    pub plan: &'a InsurancePlan,
    pub score: f64,
    /// 1-based position in descending score order
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
}

/// Sort descending by score and assign ranks `1..=N`
///
/// The sort is stable: equal scores keep their input order.
pub fn rank(mut scored: Vec<ScoredPlan<'_>>) -> Vec<MatchResult<'_>> {
    scored.sort_by(|a, b| b.score().total_cmp(&a.score()));

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| MatchResult {
            plan: entry.plan,
            score: entry.score(),
            rank: idx + 1,
            breakdown: entry.breakdown,
        })
        .collect()
}
