//! Load the plan catalog from JSON or CSV
//!
//! Each entry is converted on its own: a bad entry is logged and reported in
//! [`LoadedPlans::rejected`] without failing the rest of the catalog. An
//! age-based entry whose table cannot be parsed is kept as
//! [`PremiumStructure::Malformed`] so it resolves as unpriceable.

use super::{AgeRangeTable, CatalogSnapshot, CoverOption, InsuranceCompany, InsurancePlan, PremiumStructure};
use crate::error::CatalogError;
use csv::Reader;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default directory holding plans and companies
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog";

/// Plans converted from a source, plus entries that were rejected
#[derive(Debug, Default)]
pub struct LoadedPlans {
    pub plans: Vec<InsurancePlan>,
    pub rejected: Vec<CatalogError>,
}

impl LoadedPlans {
    fn accept(&mut self, index: usize, result: Result<InsurancePlan, CatalogError>) {
        match result {
            Ok(plan) => self.plans.push(plan),
            Err(err) => {
                log::warn!("Skipping catalog entry {}: {}", index, err);
                self.rejected.push(err);
            }
        }
    }
}

/// Catalog entry as stored in JSON
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlanRecord {
    id: String,
    company_id: String,
    #[serde(default)]
    name: Option<String>,
    tier: String,
    premium_structure: String,
    #[serde(default)]
    annual_premium: Option<f64>,
    /// Either an object or a string holding a serialized object
    #[serde(default)]
    premiums_by_age_range: Option<serde_json::Value>,
    #[serde(default)]
    inpatient_coverage_limit: Option<f64>,
    #[serde(default)]
    outpatient_coverage_limit: Option<f64>,
    #[serde(default)]
    dental_coverage_limit: Option<f64>,
    #[serde(default)]
    optical_coverage_limit: Option<f64>,
    #[serde(default)]
    maternity_coverage_limit: Option<f64>,
    #[serde(default)]
    has_dental: bool,
    #[serde(default)]
    has_optical: bool,
    #[serde(default)]
    has_maternity: bool,
    #[serde(default)]
    dental_covered_in_base: bool,
    #[serde(default)]
    optical_covered_in_base: bool,
    #[serde(default)]
    dental_premium: Option<f64>,
    #[serde(default)]
    optical_premium: Option<f64>,
    #[serde(default)]
    maternity_premium: Option<f64>,
    #[serde(default)]
    room_rate: Option<String>,
    #[serde(default)]
    bed_limit: Option<String>,
}

/// Catalog row as stored in CSV; the age table column is serialized JSON
#[derive(Debug, Deserialize)]
struct CsvPlanRow {
    #[serde(rename = "id")]
    id: String,
    #[serde(rename = "companyId")]
    company_id: String,
    #[serde(rename = "name", default)]
    name: Option<String>,
    #[serde(rename = "tier")]
    tier: String,
    #[serde(rename = "premiumStructure")]
    premium_structure: String,
    #[serde(rename = "annualPremium", default)]
    annual_premium: Option<f64>,
    #[serde(rename = "premiumsByAgeRange", default)]
    premiums_by_age_range: Option<String>,
    #[serde(rename = "inpatientCoverageLimit", default)]
    inpatient_coverage_limit: Option<f64>,
    #[serde(rename = "outpatientCoverageLimit", default)]
    outpatient_coverage_limit: Option<f64>,
    #[serde(rename = "dentalCoverageLimit", default)]
    dental_coverage_limit: Option<f64>,
    #[serde(rename = "opticalCoverageLimit", default)]
    optical_coverage_limit: Option<f64>,
    #[serde(rename = "maternityCoverageLimit", default)]
    maternity_coverage_limit: Option<f64>,
    #[serde(rename = "hasDental", default)]
    has_dental: Option<bool>,
    #[serde(rename = "hasOptical", default)]
    has_optical: Option<bool>,
    #[serde(rename = "hasMaternity", default)]
    has_maternity: Option<bool>,
    #[serde(rename = "dentalCoveredInBase", default)]
    dental_covered_in_base: Option<bool>,
    #[serde(rename = "opticalCoveredInBase", default)]
    optical_covered_in_base: Option<bool>,
    #[serde(rename = "dentalPremium", default)]
    dental_premium: Option<f64>,
    #[serde(rename = "opticalPremium", default)]
    optical_premium: Option<f64>,
    #[serde(rename = "maternityPremium", default)]
    maternity_premium: Option<f64>,
    #[serde(rename = "roomRate", default)]
    room_rate: Option<String>,
    #[serde(rename = "bedLimit", default)]
    bed_limit: Option<String>,
}

impl From<CsvPlanRow> for RawPlanRecord {
    fn from(row: CsvPlanRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            tier: row.tier,
            premium_structure: row.premium_structure,
            annual_premium: row.annual_premium,
            premiums_by_age_range: row
                .premiums_by_age_range
                .filter(|raw| !raw.trim().is_empty())
                .map(serde_json::Value::String),
            inpatient_coverage_limit: row.inpatient_coverage_limit,
            outpatient_coverage_limit: row.outpatient_coverage_limit,
            dental_coverage_limit: row.dental_coverage_limit,
            optical_coverage_limit: row.optical_coverage_limit,
            maternity_coverage_limit: row.maternity_coverage_limit,
            has_dental: row.has_dental.unwrap_or(false),
            has_optical: row.has_optical.unwrap_or(false),
            has_maternity: row.has_maternity.unwrap_or(false),
            dental_covered_in_base: row.dental_covered_in_base.unwrap_or(false),
            optical_covered_in_base: row.optical_covered_in_base.unwrap_or(false),
            dental_premium: row.dental_premium,
            optical_premium: row.optical_premium,
            maternity_premium: row.maternity_premium,
            room_rate: row.room_rate.filter(|s| !s.is_empty()),
            bed_limit: row.bed_limit.filter(|s| !s.is_empty()),
        }
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl RawPlanRecord {
    fn to_plan(self, index: usize) -> Result<InsurancePlan, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidEntry {
            index,
            plan_id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("empty plan id".to_string()));
        }

        let amounts = [
            ("annualPremium", self.annual_premium),
            ("inpatientCoverageLimit", self.inpatient_coverage_limit),
            ("outpatientCoverageLimit", self.outpatient_coverage_limit),
            ("dentalCoverageLimit", self.dental_coverage_limit),
            ("opticalCoverageLimit", self.optical_coverage_limit),
            ("maternityCoverageLimit", self.maternity_coverage_limit),
            ("dentalPremium", self.dental_premium),
            ("opticalPremium", self.optical_premium),
            ("maternityPremium", self.maternity_premium),
        ];
        for (field, amount) in amounts {
            if let Some(value) = amount {
                if !non_negative(value) {
                    return Err(invalid(format!("{} must be a non-negative amount, got {}", field, value)));
                }
            }
        }

        let premium = match self.premium_structure.trim().to_ascii_lowercase().as_str() {
            "fixed" => match self.annual_premium {
                Some(annual_premium) => PremiumStructure::Fixed { annual_premium },
                None => return Err(invalid("fixed plan without annualPremium".to_string())),
            },
            "age-based" | "age_based" | "agebased" => match &self.premiums_by_age_range {
                Some(value) => match AgeRangeTable::from_json_value(value) {
                    Ok(premiums_by_age_range) => PremiumStructure::AgeBased { premiums_by_age_range },
                    Err(err) => {
                        log::warn!("Plan {} has malformed age range premiums: {}", self.id, err);
                        PremiumStructure::Malformed { reason: err.to_string() }
                    }
                },
                None => {
                    log::warn!("Plan {} is age-based but has no premiumsByAgeRange", self.id);
                    PremiumStructure::Malformed {
                        reason: "missing premiumsByAgeRange".to_string(),
                    }
                }
            },
            other => return Err(invalid(format!("unknown premiumStructure {:?}", other))),
        };

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.company_id, self.tier));

        Ok(InsurancePlan {
            id: self.id,
            company_id: self.company_id,
            name,
            tier: self.tier,
            premium,
            inpatient_coverage_limit: self.inpatient_coverage_limit,
            outpatient_coverage_limit: self.outpatient_coverage_limit,
            dental: CoverOption {
                offered: self.has_dental,
                in_base: self.dental_covered_in_base,
                premium: self.dental_premium.unwrap_or(0.0),
                limit: self.dental_coverage_limit,
            },
            optical: CoverOption {
                offered: self.has_optical,
                in_base: self.optical_covered_in_base,
                premium: self.optical_premium.unwrap_or(0.0),
                limit: self.optical_coverage_limit,
            },
            maternity: CoverOption {
                offered: self.has_maternity,
                in_base: false,
                premium: self.maternity_premium.unwrap_or(0.0),
                limit: self.maternity_coverage_limit,
            },
            room_rate: self.room_rate,
            bed_limit: self.bed_limit,
        })
    }
}

/// Load plans from a JSON array
pub fn load_plans_from_json_reader<R: Read>(reader: R) -> Result<LoadedPlans, CatalogError> {
    let entries: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut loaded = LoadedPlans::default();

    for (index, entry) in entries.into_iter().enumerate() {
        let plan_id = entry
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or("<unknown>")
            .to_string();
        let result = serde_json::from_value::<RawPlanRecord>(entry)
            .map_err(|e| CatalogError::InvalidEntry {
                index,
                plan_id,
                reason: e.to_string(),
            })
            .and_then(|raw| raw.to_plan(index));
        loaded.accept(index, result);
    }

    Ok(loaded)
}

/// Load plans from CSV with a header row
pub fn load_plans_from_csv_reader<R: Read>(reader: R) -> Result<LoadedPlans, CatalogError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut loaded = LoadedPlans::default();

    for (index, result) in csv_reader.deserialize::<CsvPlanRow>().enumerate() {
        let result = result
            .map_err(|e| CatalogError::InvalidEntry {
                index,
                plan_id: "<unknown>".to_string(),
                reason: e.to_string(),
            })
            .and_then(|row| RawPlanRecord::from(row).to_plan(index));
        loaded.accept(index, result);
    }

    Ok(loaded)
}

/// Load plans from a `.json` or `.csv` file
pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<LoadedPlans, CatalogError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => load_plans_from_json_reader(BufReader::new(File::open(path)?)),
        Some("csv") => load_plans_from_csv_reader(File::open(path)?),
        _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load insurance companies from CSV (`id,name,logo`)
pub fn load_companies<P: AsRef<Path>>(path: P) -> Result<Vec<InsuranceCompany>, CatalogError> {
    let mut reader = Reader::from_path(path)?;
    let mut companies = Vec::new();

    for result in reader.deserialize() {
        let company: InsuranceCompany = result?;
        companies.push(company);
    }

    Ok(companies)
}

/// Load a catalog directory: `plans.json` (or `plans.csv`) and optional `companies.csv`
pub fn load_catalog(dir: &Path) -> Result<(CatalogSnapshot, Vec<CatalogError>), CatalogError> {
    let json_path = dir.join("plans.json");
    let plans_path = if json_path.exists() {
        json_path
    } else {
        dir.join("plans.csv")
    };
    let mut loaded = load_plans(&plans_path)?;

    let companies_path = dir.join("companies.csv");
    let companies = if companies_path.exists() {
        load_companies(&companies_path)?
    } else {
        Vec::new()
    };

    let company_count = companies.len();
    let (catalog, duplicates) = CatalogSnapshot::with_duplicates(loaded.plans, companies);
    loaded.rejected.extend(duplicates);

    log::info!(
        "Loaded {} plans ({} rejected) and {} companies from {}",
        catalog.len(),
        loaded.rejected.len(),
        company_count,
        dir.display()
    );

    Ok((catalog, loaded.rejected))
}

/// Load the catalog from the default data/catalog location
pub fn load_default_catalog() -> Result<(CatalogSnapshot, Vec<CatalogError>), CatalogError> {
    load_catalog(Path::new(DEFAULT_CATALOG_PATH))
}
