//! Match scoring of a plan against a user query
//!
//! score = coverage term + budget term + room term + perturbation, capped.

use super::premium::query_premium;
use super::query::UserQuery;
use crate::plan::InsurancePlan;
use crate::tables::ScoringTables;
use rand::{Rng, RngCore};
use serde::Serialize;

/// Source of the random perturbation added to each score
///
/// Returns a unit draw in `[0, 1)`; the scorer scales it by the configured
/// maximum jitter. Any `rand` generator is a source, so tests can pass a
/// seeded one or [`NoJitter`].
pub trait JitterSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: RngCore> JitterSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Jitter source that always draws zero
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_unit(&mut self) -> f64 {
        0.0
    }
}

/// Fixed draw for every plan, used to pin scores in tests and demos
#[derive(Debug, Clone, Copy)]
pub struct ConstantJitter(pub f64);

impl JitterSource for ConstantJitter {
    fn next_unit(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Per-term contributions to a plan's score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub coverage: f64,
    pub budget: f64,
    pub room: f64,
    pub jitter: f64,
    /// Capped sum of the terms above
    pub total: f64,
}

/// Coverage-tier term
pub fn coverage_term(plan: &InsurancePlan, query: &UserQuery, tables: &ScoringTables) -> f64 {
    if tables.tier_matches(query.desired_coverage, &plan.tier) {
        tables.weights.coverage
    } else {
        0.0
    }
}

/// Budget term
///
/// Plans within budget score `weight * max(premium / ceiling, floor_ratio)`,
/// so anything using at least the floor share of the budget earns the full
/// weight. Over budget, unpriceable, or unknown bucket scores zero.
pub fn budget_term(plan: &InsurancePlan, query: &UserQuery, tables: &ScoringTables) -> f64 {
    let Some(max_budget) = query.budget.as_deref().and_then(|b| tables.max_budget(b)) else {
        return 0.0;
    };
    let Some(premium) = query_premium(plan, query.applicant()).amount() else {
        return 0.0;
    };
    if max_budget <= 0.0 || premium > max_budget {
        return 0.0;
    }

    let weights = &tables.weights;
    let ratio = premium / max_budget;
    weights.budget * ratio.max(weights.budget_floor_ratio).min(1.0)
}

/// Room-type term
pub fn room_term(plan: &InsurancePlan, query: &UserQuery, tables: &ScoringTables) -> f64 {
    if tables.room_matches(query.room_type, plan.room_descriptors()) {
        tables.weights.room
    } else {
        0.0
    }
}

/// Score a plan with an already drawn unit jitter value
pub fn score_with_draw(
    plan: &InsurancePlan,
    query: &UserQuery,
    tables: &ScoringTables,
    unit_draw: f64,
) -> ScoreBreakdown {
    let weights = &tables.weights;
    let coverage = coverage_term(plan, query, tables);
    let budget = budget_term(plan, query, tables);
    let room = room_term(plan, query, tables);
    let jitter = unit_draw.clamp(0.0, 1.0 - f64::EPSILON) * weights.max_jitter;

    let total = (coverage + budget + room + jitter).clamp(0.0, weights.score_cap);

    ScoreBreakdown {
        coverage,
        budget,
        room,
        jitter,
        total,
    }
}

/// Score a plan, drawing the perturbation from `jitter`
pub fn score_plan<J: JitterSource + ?Sized>(
    plan: &InsurancePlan,
    query: &UserQuery,
    tables: &ScoringTables,
    jitter: &mut J,
) -> ScoreBreakdown {
    score_with_draw(plan, query, tables, jitter.next_unit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{CoverageLevel, RoomType};
    use crate::plan::AgeRangeTable;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn query() -> UserQuery {
        UserQuery {
            desired_coverage: CoverageLevel::Enhanced,
            budget: Some("60k-80k".to_string()),
            age: Some(68),
            room_type: RoomType::Private,
            ..Default::default()
        }
    }

    fn gold_private(premium: f64) -> InsurancePlan {
        InsurancePlan::fixed("gold", "acme", "Gold", premium).with_room_rate("Deluxe Private Room")
    }

    #[test]
    fn test_full_match_without_jitter() {
        let tables = ScoringTables::default_tables();
        // Ceiling for 60k-80k is 100,000; 90,000 uses 90% of it
        let score = score_plan(&gold_private(90_000.0), &query(), &tables, &mut NoJitter);
        assert_abs_diff_eq!(score.coverage, 0.4);
        assert_abs_diff_eq!(score.budget, 0.27, epsilon = 1e-12);
        assert_abs_diff_eq!(score.room, 0.2);
        assert_abs_diff_eq!(score.total, 0.87, epsilon = 1e-12);
    }

    #[test]
    fn test_budget_floor_ratio() {
        let tables = ScoringTables::default_tables();
        let q = query();
        // 20% of budget still earns the 0.7 floor
        assert_abs_diff_eq!(budget_term(&gold_private(20_000.0), &q, &tables), 0.21, epsilon = 1e-12);
        assert_abs_diff_eq!(budget_term(&gold_private(70_000.0), &q, &tables), 0.21, epsilon = 1e-12);
        assert_abs_diff_eq!(budget_term(&gold_private(100_000.0), &q, &tables), 0.3, epsilon = 1e-12);
        assert_eq!(budget_term(&gold_private(100_001.0), &q, &tables), 0.0);
    }

    #[test]
    fn test_unpriceable_and_unknown_budget_score_zero() {
        let tables = ScoringTables::default_tables();
        let table = AgeRangeTable::from_map([("18-40", 20000.0)]).unwrap();
        let plan = InsurancePlan::age_based("young", "acme", "Gold", table);
        assert_eq!(budget_term(&plan, &query(), &tables), 0.0);

        let mut q = query();
        q.budget = Some("a lot".to_string());
        assert_eq!(budget_term(&gold_private(50_000.0), &q, &tables), 0.0);
        q.budget = None;
        assert_eq!(budget_term(&gold_private(50_000.0), &q, &tables), 0.0);
    }

    #[test]
    fn test_unknown_vocabulary_scores_zero_terms() {
        let tables = ScoringTables::default_tables();
        let q = UserQuery {
            desired_coverage: CoverageLevel::Unknown,
            room_type: RoomType::Unknown,
            ..Default::default()
        };
        let score = score_plan(&gold_private(50_000.0), &q, &tables, &mut NoJitter);
        assert_eq!(score.total, 0.0);
    }

    #[test]
    fn test_cap_applies() {
        let tables = ScoringTables::default_tables();
        let score = score_with_draw(&gold_private(100_000.0), &query(), &tables, 0.999);
        assert_abs_diff_eq!(score.total, 0.98);
    }

    #[test]
    fn test_score_bounds_over_grid() {
        let tables = ScoringTables::default_tables();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let tiers = ["Bronze", "Silver", "Gold", "Diamond", "Platinum", "Royal", "Custom"];
        let rooms = ["General Ward", "Private Room", "Deluxe Private Room", "Ensuite", ""];
        let budgets = ["below-20k", "40k-60k", "100k-150k", "above-150k", "unknown"];

        for tier in tiers {
            for room in rooms {
                for premium in [0.0, 15_000.0, 60_000.0, 250_000.0] {
                    let plan = InsurancePlan::fixed("p", "acme", tier, premium).with_room_rate(room);
                    for level in CoverageLevel::KNOWN {
                        for budget in budgets {
                            let q = UserQuery {
                                desired_coverage: level,
                                budget: Some(budget.to_string()),
                                room_type: RoomType::Deluxe,
                                ..Default::default()
                            };
                            let score = score_plan(&plan, &q, &tables, &mut rng);
                            assert!((0.0..=0.98).contains(&score.total), "score {}", score.total);
                            assert!((0.0..0.1).contains(&score.jitter));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let tables = ScoringTables::default_tables();
        let plan = gold_private(80_000.0);
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(
                score_plan(&plan, &query(), &tables, &mut a),
                score_plan(&plan, &query(), &tables, &mut b)
            );
        }
    }
}
