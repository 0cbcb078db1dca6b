//! Plan catalog data structures and loading

mod age_range;
mod catalog;
mod data;
pub mod loader;

pub use age_range::{AgeBand, AgeRange, AgeRangeTable};
pub use catalog::CatalogSnapshot;
pub use data::{CoverOption, CoverTerms, InsuranceCompany, InsurancePlan, OptionalCover, PremiumStructure};
pub use loader::{load_catalog, load_default_catalog, load_plans, LoadedPlans};
