//! Plan data structures matching the comparison catalog format

use super::age_range::AgeRangeTable;
use serde::{Deserialize, Serialize};

/// How a plan's annual premium is determined
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "premiumStructure", rename_all = "kebab-case")]
pub enum PremiumStructure {
    /// Flat annual premium regardless of age
    Fixed {
        #[serde(rename = "annualPremium")]
        annual_premium: f64,
    },
    /// Premium depends on the applicant's age bracket
    AgeBased {
        #[serde(rename = "premiumsByAgeRange")]
        premiums_by_age_range: AgeRangeTable,
    },
    /// Age-based plan whose table could not be parsed; never priceable
    Malformed { reason: String },
}

/// Add-on covers a user can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionalCover {
    Dental,
    Optical,
    Maternity,
}

impl OptionalCover {
    pub const ALL: [OptionalCover; 3] = [
        OptionalCover::Dental,
        OptionalCover::Optical,
        OptionalCover::Maternity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionalCover::Dental => "dental",
            OptionalCover::Optical => "optical",
            OptionalCover::Maternity => "maternity",
        }
    }
}

/// How a plan offers a particular optional cover
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CoverTerms {
    /// Plan does not offer the cover as an add-on
    NotOffered,
    /// Already part of the base premium; cannot be added again
    IncludedInBase,
    /// User may add it for the given annual premium
    Toggleable { premium: f64 },
    /// Present with the plan but not user selectable
    LockedIncluded,
}

/// Optional cover flags and prices for one cover type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverOption {
    /// Whether the plan offers the cover at all
    pub offered: bool,
    /// Cost already folded into the base premium
    pub in_base: bool,
    /// Additive annual cost when not bundled
    pub premium: f64,
    /// Benefit limit, `None` when not stated
    pub limit: Option<f64>,
}

/// Insurance company shown alongside its plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceCompany {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// A single plan from the comparison catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlan {
    /// Unique plan identifier
    pub id: String,

    /// Owning insurance company
    pub company_id: String,

    /// Display name of the plan
    pub name: String,

    /// Provider tier label (Bronze, Gold, ...)
    pub tier: String,

    #[serde(flatten)]
    pub premium: PremiumStructure,

    pub inpatient_coverage_limit: Option<f64>,
    pub outpatient_coverage_limit: Option<f64>,

    pub dental: CoverOption,
    pub optical: CoverOption,
    pub maternity: CoverOption,

    /// Free-text room descriptor ("General Ward", "Deluxe Private Room")
    pub room_rate: Option<String>,

    /// Free-text bed limit descriptor
    pub bed_limit: Option<String>,
}

impl InsurancePlan {
    /// Create a fixed-premium plan with no optional covers
    pub fn fixed(id: &str, company_id: &str, tier: &str, annual_premium: f64) -> Self {
        Self::with_premium(
            id,
            company_id,
            tier,
            PremiumStructure::Fixed { annual_premium },
        )
    }

    /// Create an age-based plan with no optional covers
    pub fn age_based(id: &str, company_id: &str, tier: &str, table: AgeRangeTable) -> Self {
        Self::with_premium(
            id,
            company_id,
            tier,
            PremiumStructure::AgeBased {
                premiums_by_age_range: table,
            },
        )
    }

    fn with_premium(id: &str, company_id: &str, tier: &str, premium: PremiumStructure) -> Self {
        Self {
            id: id.to_string(),
            company_id: company_id.to_string(),
            name: format!("{} {}", company_id, tier),
            tier: tier.to_string(),
            premium,
            inpatient_coverage_limit: None,
            outpatient_coverage_limit: None,
            dental: CoverOption::default(),
            optical: CoverOption::default(),
            maternity: CoverOption::default(),
            room_rate: None,
            bed_limit: None,
        }
    }

    /// Set the room descriptor
    pub fn with_room_rate(mut self, room_rate: &str) -> Self {
        self.room_rate = Some(room_rate.to_string());
        self
    }

    /// Get the cover option record for a cover type
    pub fn cover_option(&self, cover: OptionalCover) -> &CoverOption {
        match cover {
            OptionalCover::Dental => &self.dental,
            OptionalCover::Optical => &self.optical,
            OptionalCover::Maternity => &self.maternity,
        }
    }

    /// How this plan offers the given optional cover
    ///
    /// Dental and optical are user toggleable unless bundled. Maternity is
    /// never toggleable: when offered it is locked to the base plan.
    pub fn cover_terms(&self, cover: OptionalCover) -> CoverTerms {
        let option = self.cover_option(cover);
        match cover {
            OptionalCover::Dental | OptionalCover::Optical => {
                if option.in_base {
                    CoverTerms::IncludedInBase
                } else if option.offered && option.premium > 0.0 {
                    CoverTerms::Toggleable {
                        premium: option.premium,
                    }
                } else {
                    CoverTerms::NotOffered
                }
            }
            OptionalCover::Maternity => {
                if option.offered {
                    CoverTerms::LockedIncluded
                } else {
                    CoverTerms::NotOffered
                }
            }
        }
    }

    /// Room and bed descriptors present on the plan
    pub fn room_descriptors(&self) -> impl Iterator<Item = &str> {
        self.room_rate
            .as_deref()
            .into_iter()
            .chain(self.bed_limit.as_deref())
    }
}
