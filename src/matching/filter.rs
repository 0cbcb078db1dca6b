//! Budget pre-filter over the catalog

use super::premium::minimum_premium;
use crate::plan::InsurancePlan;

/// Plans whose cheapest achievable premium fits within `max_budget`
///
/// Age-based plans pass on their cheapest band. A plan can therefore pass
/// here and still be unpriceable or over budget for a particular applicant:
/// this selects candidates, it does not guarantee a price.
pub fn filter_by_budget<'a, I>(plans: I, max_budget: f64) -> Vec<&'a InsurancePlan>
where
    I: IntoIterator<Item = &'a InsurancePlan>,
{
    plans
        .into_iter()
        .filter(|plan| match minimum_premium(plan) {
            Some(min) => min <= max_budget,
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{AgeRangeTable, PremiumStructure};

    fn catalog() -> Vec<InsurancePlan> {
        let senior = AgeRangeTable::from_map([("65-69", 57952.0), ("70-74", 68819.0)]).unwrap();
        let mut broken = InsurancePlan::fixed("broken", "acme", "Gold", 0.0);
        broken.premium = PremiumStructure::Malformed { reason: "bad".to_string() };

        vec![
            InsurancePlan::fixed("cheap", "acme", "Bronze", 18000.0),
            InsurancePlan::fixed("dear", "acme", "Platinum", 150000.0),
            InsurancePlan::age_based("senior", "acme", "Gold", senior),
            InsurancePlan::age_based("empty", "acme", "Gold", AgeRangeTable::default()),
            broken,
        ]
    }

    #[test]
    fn test_filter_by_budget() {
        let plans = catalog();
        let ids = |max: f64| -> Vec<String> {
            filter_by_budget(&plans, max).iter().map(|p| p.id.clone()).collect()
        };

        assert_eq!(ids(20_000.0), vec!["cheap"]);
        // Passes on its cheapest band even though older applicants cost more
        assert_eq!(ids(60_000.0), vec!["cheap", "senior"]);
        assert_eq!(ids(57_952.0), vec!["cheap", "senior"]);
        assert_eq!(ids(1_000_000.0), vec!["cheap", "dear", "senior"]);
        assert!(ids(100.0).is_empty());
    }

    #[test]
    fn test_inclusion_iff_minimum_within_budget() {
        let plans = catalog();
        for max in [0.0, 17_999.0, 18_000.0, 57_951.0, 68_819.0, 150_000.0, 200_000.0] {
            let kept = filter_by_budget(&plans, max);
            for plan in &plans {
                let expected = minimum_premium(plan).map_or(false, |min| min <= max);
                let included = kept.iter().any(|p| p.id == plan.id);
                assert_eq!(included, expected, "plan {} at budget {}", plan.id, max);
            }
        }
    }

    #[test]
    fn test_empty_catalog() {
        let plans: Vec<InsurancePlan> = Vec::new();
        assert!(filter_by_budget(&plans, 50_000.0).is_empty());
    }
}
