//! Premium resolution for fixed and age-bracketed plans

use super::query::ApplicantAge;
use crate::plan::{InsurancePlan, PremiumStructure};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Label shown when no premium can be determined
pub const CONTACT_FOR_PRICING: &str = "Contact for pricing";

/// Label shown in listings for age-based plans when no age is known
pub const AGE_BASED: &str = "Age-based";

/// Resolved annual premium
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Premium {
    Amount(f64),
    /// No band covers the age, or the plan's age data is malformed
    Unpriceable,
}

impl Premium {
    pub fn amount(&self) -> Option<f64> {
        match *self {
            Premium::Amount(amount) => Some(amount),
            Premium::Unpriceable => None,
        }
    }

    pub fn is_unpriceable(&self) -> bool {
        matches!(self, Premium::Unpriceable)
    }

    /// Text shown to the user
    pub fn display_label(&self) -> String {
        match *self {
            Premium::Amount(amount) => format_amount(amount),
            Premium::Unpriceable => CONTACT_FOR_PRICING.to_string(),
        }
    }
}

impl From<Option<f64>> for Premium {
    fn from(amount: Option<f64>) -> Self {
        amount.map(Premium::Amount).unwrap_or(Premium::Unpriceable)
    }
}

/// `{"premium": n}` or `{"unpriceable": true}`
impl Serialize for Premium {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match *self {
            Premium::Amount(amount) => map.serialize_entry("premium", &amount)?,
            Premium::Unpriceable => map.serialize_entry("unpriceable", &true)?,
        }
        map.end()
    }
}

/// Cheapest and dearest premium a plan can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PremiumSpan {
    pub min: f64,
    pub max: f64,
}

impl PremiumSpan {
    pub fn display_label(&self) -> String {
        if self.min == self.max {
            format_amount(self.min)
        } else {
            format!("{} - {}", format_amount(self.min), format_amount(self.max))
        }
    }
}

/// Format a whole-currency amount with thousands separators
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Annual premium of `plan` for an applicant of `age`
///
/// Fixed plans ignore age. Age-based plans return the premium of the first
/// band, in ascending lower-bound order, that contains the age.
pub fn resolve_premium(plan: &InsurancePlan, age: u8) -> Premium {
    match &plan.premium {
        PremiumStructure::Fixed { annual_premium } => Premium::Amount(*annual_premium),
        PremiumStructure::AgeBased { premiums_by_age_range } => {
            premiums_by_age_range.lookup(age).into()
        }
        PremiumStructure::Malformed { .. } => Premium::Unpriceable,
    }
}

/// Premium used when scoring a plan against a query
///
/// An exact age resolves normally. Without one, an age bracket that matches
/// one of the plan's own descriptors uses that band; otherwise the plan's
/// first band (lowest lower bound) stands in for the applicant. This is an
/// approximation for bracket-style queries, not an exact quote.
pub fn query_premium(plan: &InsurancePlan, applicant: ApplicantAge) -> Premium {
    match (&plan.premium, applicant) {
        (_, ApplicantAge::Exact(age)) => resolve_premium(plan, age),
        (PremiumStructure::Fixed { annual_premium }, _) => Premium::Amount(*annual_premium),
        (PremiumStructure::AgeBased { premiums_by_age_range }, ApplicantAge::Range(range)) => {
            premiums_by_age_range
                .lookup_range(&range)
                .or_else(|| premiums_by_age_range.first().map(|band| band.premium))
                .into()
        }
        (PremiumStructure::AgeBased { premiums_by_age_range }, ApplicantAge::Unspecified) => {
            premiums_by_age_range.first().map(|band| band.premium).into()
        }
        (PremiumStructure::Malformed { .. }, _) => Premium::Unpriceable,
    }
}

/// Lowest premium the plan can resolve to for any age
pub fn minimum_premium(plan: &InsurancePlan) -> Option<f64> {
    premium_span(plan).map(|span| span.min)
}

/// Premium span across all ages
pub fn premium_span(plan: &InsurancePlan) -> Option<PremiumSpan> {
    match &plan.premium {
        PremiumStructure::Fixed { annual_premium } => Some(PremiumSpan {
            min: *annual_premium,
            max: *annual_premium,
        }),
        PremiumStructure::AgeBased { premiums_by_age_range } => {
            match (premiums_by_age_range.min_premium(), premiums_by_age_range.max_premium()) {
                (Some(min), Some(max)) => Some(PremiumSpan { min, max }),
                _ => None,
            }
        }
        PremiumStructure::Malformed { .. } => None,
    }
}

/// Listing label for a plan when no applicant age is known
pub fn listing_label(plan: &InsurancePlan) -> String {
    match &plan.premium {
        PremiumStructure::Fixed { annual_premium } => format_amount(*annual_premium),
        PremiumStructure::AgeBased { premiums_by_age_range } if !premiums_by_age_range.is_empty() => {
            AGE_BASED.to_string()
        }
        _ => CONTACT_FOR_PRICING.to_string(),
    }
}
