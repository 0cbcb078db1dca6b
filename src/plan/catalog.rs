//! Immutable catalog snapshot passed explicitly to every engine call

use super::{InsuranceCompany, InsurancePlan};
use crate::error::CatalogError;
use std::collections::HashMap;

/// Read-only set of plans and companies for one or more matching runs
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    plans: Vec<InsurancePlan>,
    companies: HashMap<String, InsuranceCompany>,
    plan_index: HashMap<String, usize>,
}

impl CatalogSnapshot {
    /// Build a snapshot. Later plans with a duplicate id are dropped.
    pub fn new(plans: Vec<InsurancePlan>, companies: Vec<InsuranceCompany>) -> Self {
        Self::with_duplicates(plans, companies).0
    }

    /// Build a snapshot, returning a rejection for every dropped duplicate.
    /// `index` in each rejection is the plan's position in `plans`.
    pub fn with_duplicates(
        plans: Vec<InsurancePlan>,
        companies: Vec<InsuranceCompany>,
    ) -> (Self, Vec<CatalogError>) {
        let mut kept = Vec::with_capacity(plans.len());
        let mut plan_index = HashMap::with_capacity(plans.len());
        let mut duplicates = Vec::new();

        for (index, plan) in plans.into_iter().enumerate() {
            if plan_index.contains_key(&plan.id) {
                log::warn!("Duplicate plan id {} in catalog, keeping first occurrence", plan.id);
                duplicates.push(CatalogError::InvalidEntry {
                    index,
                    plan_id: plan.id,
                    reason: "duplicate plan id".to_string(),
                });
                continue;
            }
            plan_index.insert(plan.id.clone(), kept.len());
            kept.push(plan);
        }

        let companies = companies
            .into_iter()
            .map(|company| (company.id.clone(), company))
            .collect();

        let snapshot = Self {
            plans: kept,
            companies,
            plan_index,
        };
        (snapshot, duplicates)
    }

    /// Snapshot with plans only
    pub fn from_plans(plans: Vec<InsurancePlan>) -> Self {
        Self::new(plans, Vec::new())
    }

    /// Plans in catalog order
    pub fn plans(&self) -> &[InsurancePlan] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn plan(&self, id: &str) -> Option<&InsurancePlan> {
        self.plan_index.get(id).map(|&idx| &self.plans[idx])
    }

    pub fn company(&self, id: &str) -> Option<&InsuranceCompany> {
        self.companies.get(id)
    }

    /// Company display name for a plan, falling back to the company id
    pub fn company_name<'a>(&'a self, plan: &'a InsurancePlan) -> &'a str {
        self.company(&plan.company_id)
            .map(|company| company.name.as_str())
            .unwrap_or(plan.company_id.as_str())
    }
}
