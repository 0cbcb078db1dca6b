//! Report envelope handed to UI collaborators

use super::premium::{query_premium, Premium};
use super::query::UserQuery;
use super::ranker::MatchResult;
use super::scorer::ScoreBreakdown;
use crate::plan::CatalogSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display-ready row for one ranked plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub rank: usize,
    pub plan_id: String,
    pub plan_name: String,
    pub company_name: String,
    pub tier: String,
    pub score: f64,
    /// Premium the score was computed from
    pub premium: Premium,
    pub premium_label: String,
    pub breakdown: ScoreBreakdown,
}

/// Ranked results with the query that produced them
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub generated_at: DateTime<Utc>,
    pub query: UserQuery,
    pub result_count: usize,
    pub results: Vec<ReportEntry>,
}

impl MatchReport {
    /// Build the envelope from ranked results, keeping their order
    pub fn assemble(catalog: &CatalogSnapshot, query: &UserQuery, results: &[MatchResult<'_>]) -> Self {
        let applicant = query.applicant();
        let entries = results
            .iter()
            .map(|result| {
                let premium = query_premium(result.plan, applicant);
                ReportEntry {
                    rank: result.rank,
                    plan_id: result.plan.id.clone(),
                    plan_name: result.plan.name.clone(),
                    company_name: catalog.company_name(result.plan).to_string(),
                    tier: result.plan.tier.clone(),
                    score: result.score,
                    premium,
                    premium_label: premium.display_label(),
                    breakdown: result.breakdown,
                }
            })
            .collect::<Vec<_>>();

        Self {
            generated_at: Utc::now(),
            query: query.clone(),
            result_count: entries.len(),
            results: entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ranker::{rank, ScoredPlan};
    use crate::plan::{AgeRangeTable, InsuranceCompany, InsurancePlan};

    #[test]
    fn test_assemble_keeps_rank_order() {
        let table = AgeRangeTable::from_map([("18-40", 20000.0)]).unwrap();
        let catalog = CatalogSnapshot::new(
            vec![
                InsurancePlan::fixed("a", "acme", "Gold", 48000.0),
                InsurancePlan::age_based("b", "acme", "Silver", table),
            ],
            vec![InsuranceCompany { id: "acme".to_string(), name: "Acme Health".to_string(), logo: None }],
        );
        let plans = catalog.plans();
        let ranked = rank(vec![
            ScoredPlan::with_total(&plans[0], 0.3),
            ScoredPlan::with_total(&plans[1], 0.6),
        ]);

        let query = UserQuery { age: Some(55), ..Default::default() };
        let report = MatchReport::assemble(&catalog, &query, &ranked);

        assert_eq!(report.result_count, 2);
        assert_eq!(report.results[0].plan_id, "b");
        assert_eq!(report.results[0].premium, Premium::Unpriceable);
        assert_eq!(report.results[0].premium_label, "Contact for pricing");
        assert_eq!(report.results[1].premium_label, "48,000");
        assert_eq!(report.results[1].company_name, "Acme Health");
    }

    #[test]
    fn test_empty_report() {
        let report = MatchReport::assemble(&CatalogSnapshot::default(), &UserQuery::default(), &[]);
        assert!(report.is_empty());
        assert_eq!(report.result_count, 0);
    }
}
