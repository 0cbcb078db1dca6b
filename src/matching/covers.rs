//! Optional cover adjustment of a base premium
//!
//! Each cover dispatches on the plan's [`CoverTerms`]. Only toggleable covers
//! that the user selected add to the total; bundled and locked covers are
//! already part of the base premium.

use crate::plan::{CoverTerms, InsurancePlan, OptionalCover};
use serde::Serialize;
use std::collections::BTreeSet;

/// What happened to one optional cover during adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverState {
    /// Selected and charged
    Added,
    /// Offered as an add-on but not selected
    NotSelected,
    /// Already in the base premium
    Bundled,
    /// Present with the plan, not user selectable
    Locked,
    /// Not available on this plan
    NotOffered,
}

/// One cover's contribution to the adjusted premium
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverLine {
    pub cover: OptionalCover,
    pub state: CoverState,
    pub amount: f64,
}

/// Base premium plus optional cover contributions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedPremium {
    pub base_premium: f64,
    pub lines: Vec<CoverLine>,
    pub total_premium: f64,
}

impl AdjustedPremium {
    /// Contribution of a single cover
    pub fn contribution(&self, cover: OptionalCover) -> f64 {
        self.lines
            .iter()
            .find(|line| line.cover == cover)
            .map(|line| line.amount)
            .unwrap_or(0.0)
    }
}

fn cover_line(plan: &InsurancePlan, cover: OptionalCover, selected: &BTreeSet<OptionalCover>) -> CoverLine {
    let (state, amount) = match plan.cover_terms(cover) {
        CoverTerms::Toggleable { premium } if selected.contains(&cover) => (CoverState::Added, premium),
        CoverTerms::Toggleable { .. } => (CoverState::NotSelected, 0.0),
        CoverTerms::IncludedInBase => (CoverState::Bundled, 0.0),
        CoverTerms::LockedIncluded => (CoverState::Locked, 0.0),
        CoverTerms::NotOffered => (CoverState::NotOffered, 0.0),
    };
    CoverLine { cover, state, amount }
}

/// Premium including the user's selected optional covers
pub fn adjusted_premium(
    plan: &InsurancePlan,
    base_premium: f64,
    selected: &BTreeSet<OptionalCover>,
) -> AdjustedPremium {
    let lines: Vec<CoverLine> = OptionalCover::ALL
        .iter()
        .map(|&cover| cover_line(plan, cover, selected))
        .collect();
    let total_premium = base_premium + lines.iter().map(|line| line.amount).sum::<f64>();

    AdjustedPremium {
        base_premium,
        lines,
        total_premium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::CoverOption;

    fn selected(covers: &[OptionalCover]) -> BTreeSet<OptionalCover> {
        covers.iter().copied().collect()
    }

    fn plan() -> InsurancePlan {
        let mut plan = InsurancePlan::fixed("p", "acme", "Gold", 48000.0);
        plan.dental = CoverOption { offered: true, in_base: false, premium: 6000.0, limit: Some(50000.0) };
        plan.optical = CoverOption { offered: true, in_base: false, premium: 4000.0, limit: Some(30000.0) };
        plan.maternity = CoverOption { offered: true, in_base: false, premium: 25000.0, limit: Some(150000.0) };
        plan
    }

    #[test]
    fn test_bundled_dental_adds_nothing() {
        let mut plan = plan();
        plan.dental = CoverOption { offered: true, in_base: true, premium: 30000.0, limit: None };

        let adjusted = adjusted_premium(&plan, 48000.0, &selected(&[OptionalCover::Dental]));
        assert_eq!(adjusted.contribution(OptionalCover::Dental), 0.0);
        assert_eq!(adjusted.total_premium, 48000.0);
        assert_eq!(adjusted.lines[0].state, CoverState::Bundled);
    }

    #[test]
    fn test_selected_covers_added() {
        let adjusted = adjusted_premium(
            &plan(),
            48000.0,
            &selected(&[OptionalCover::Dental, OptionalCover::Optical]),
        );
        assert_eq!(adjusted.total_premium, 58000.0);

        let only_optical = adjusted_premium(&plan(), 48000.0, &selected(&[OptionalCover::Optical]));
        assert_eq!(only_optical.total_premium, 52000.0);
        assert_eq!(only_optical.lines[0].state, CoverState::NotSelected);
    }

    #[test]
    fn test_maternity_selection_is_ignored() {
        let adjusted = adjusted_premium(&plan(), 48000.0, &selected(&[OptionalCover::Maternity]));
        assert_eq!(adjusted.contribution(OptionalCover::Maternity), 0.0);
        assert_eq!(adjusted.total_premium, 48000.0);
        assert_eq!(adjusted.lines[2].state, CoverState::Locked);
    }

    #[test]
    fn test_unoffered_or_free_cover_not_added() {
        let mut plan = plan();
        plan.dental.offered = false;
        plan.optical.premium = 0.0;

        let adjusted = adjusted_premium(
            &plan,
            10000.0,
            &selected(&[OptionalCover::Dental, OptionalCover::Optical]),
        );
        assert_eq!(adjusted.total_premium, 10000.0);
        assert!(adjusted.lines[..2].iter().all(|l| l.state == CoverState::NotOffered));
    }
}
