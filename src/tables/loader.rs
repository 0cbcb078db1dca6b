//! CSV-based scoring table loader
//!
//! Loads scoring tables from CSV files in data/tables/

use super::BudgetCeiling;
use crate::error::TableError;
use crate::matching::{CoverageLevel, RoomType};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to tables directory
pub const DEFAULT_TABLES_PATH: &str = "data/tables";

fn open_table(path: &Path, file: &str) -> Result<csv::Reader<File>, TableError> {
    let handle = File::open(path.join(file)).map_err(|source| TableError::Io {
        file: file.to_string(),
        source,
    })?;
    Ok(csv::Reader::from_reader(handle))
}

fn csv_error(file: &str) -> impl Fn(csv::Error) -> TableError + '_ {
    move |source| TableError::Csv {
        file: file.to_string(),
        source,
    }
}

fn invalid(file: &str, reason: String) -> TableError {
    TableError::InvalidValue {
        file: file.to_string(),
        reason,
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, file: &str) -> Result<&'r str, TableError> {
    record.get(index).ok_or_else(|| {
        invalid(
            file,
            format!("row {:?} has no column {}", record.iter().collect::<Vec<_>>(), index + 1),
        )
    })
}

const COVERAGE_TIERS_FILE: &str = "coverage_tiers.csv";
const BUDGET_CEILINGS_FILE: &str = "budget_ceilings.csv";
const ROOM_KEYWORDS_FILE: &str = "room_keywords.csv";

/// Load coverage level → tier labels (`coverage,tier`)
pub fn load_coverage_tiers(path: &Path) -> Result<HashMap<CoverageLevel, Vec<String>>, TableError> {
    read_coverage_tiers(open_table(path, COVERAGE_TIERS_FILE)?)
}

/// Read coverage tiers from CSV with a header row
pub fn read_coverage_tiers<R: Read>(
    mut reader: csv::Reader<R>,
) -> Result<HashMap<CoverageLevel, Vec<String>>, TableError> {
    const FILE: &str = COVERAGE_TIERS_FILE;
    let mut tiers: HashMap<CoverageLevel, Vec<String>> = HashMap::new();

    for result in reader.records() {
        let record = result.map_err(csv_error(FILE))?;
        let label = field(&record, 0, FILE)?;
        let level = CoverageLevel::parse(label);
        if level == CoverageLevel::Unknown {
            return Err(invalid(FILE, format!("unknown coverage level {:?}", label)));
        }
        tiers.entry(level).or_default().push(field(&record, 1, FILE)?.trim().to_string());
    }

    Ok(tiers)
}

/// Load budget buckets (`bucket,nominal,ceiling`), keeping file order
pub fn load_budget_ceilings(path: &Path) -> Result<Vec<BudgetCeiling>, TableError> {
    read_budget_ceilings(open_table(path, BUDGET_CEILINGS_FILE)?)
}

/// Read budget buckets from CSV with a header row
pub fn read_budget_ceilings<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<BudgetCeiling>, TableError> {
    const FILE: &str = BUDGET_CEILINGS_FILE;
    let mut ceilings = Vec::new();

    for result in reader.records() {
        let record = result.map_err(csv_error(FILE))?;
        let bucket = field(&record, 0, FILE)?.trim().to_string();
        let raw_nominal = field(&record, 1, FILE)?;
        let nominal: f64 = raw_nominal
            .trim()
            .parse()
            .map_err(|_| invalid(FILE, format!("bad nominal amount {:?}", raw_nominal)))?;
        let raw_ceiling = field(&record, 2, FILE)?;
        let ceiling: f64 = raw_ceiling
            .trim()
            .parse()
            .map_err(|_| invalid(FILE, format!("bad ceiling {:?}", raw_ceiling)))?;

        if ceiling <= nominal {
            return Err(invalid(
                FILE,
                format!("ceiling {} for {} must exceed nominal {}", ceiling, bucket, nominal),
            ));
        }

        ceilings.push(BudgetCeiling {
            bucket,
            nominal,
            ceiling,
        });
    }

    Ok(ceilings)
}

/// Load room type → keywords (`room_type,keyword`)
pub fn load_room_keywords(path: &Path) -> Result<HashMap<RoomType, Vec<String>>, TableError> {
    read_room_keywords(open_table(path, ROOM_KEYWORDS_FILE)?)
}

/// Read room keywords from CSV with a header row
pub fn read_room_keywords<R: Read>(
    mut reader: csv::Reader<R>,
) -> Result<HashMap<RoomType, Vec<String>>, TableError> {
    const FILE: &str = ROOM_KEYWORDS_FILE;
    let mut keywords: HashMap<RoomType, Vec<String>> = HashMap::new();

    for result in reader.records() {
        let record = result.map_err(csv_error(FILE))?;
        let label = field(&record, 0, FILE)?;
        let room_type = RoomType::parse(label);
        if room_type == RoomType::Unknown {
            return Err(invalid(FILE, format!("unknown room type {:?}", label)));
        }
        // Keywords are matched case sensitively, keep them verbatim
        keywords.entry(room_type).or_default().push(field(&record, 1, FILE)?.to_string());
    }

    Ok(keywords)
}

/// All tables loaded from a directory
pub struct LoadedTables {
    pub coverage_tiers: HashMap<CoverageLevel, Vec<String>>,
    pub budget_ceilings: Vec<BudgetCeiling>,
    pub room_keywords: HashMap<RoomType, Vec<String>>,
}

impl LoadedTables {
    /// Load all tables from the default path
    pub fn load_default() -> Result<Self, TableError> {
        Self::load_from(Path::new(DEFAULT_TABLES_PATH))
    }

    /// Load all tables from a specific path
    pub fn load_from(path: &Path) -> Result<Self, TableError> {
        Ok(Self {
            coverage_tiers: load_coverage_tiers(path)?,
            budget_ceilings: load_budget_ceilings(path)?,
            room_keywords: load_room_keywords(path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_tables() {
        let result = LoadedTables::load_default();
        assert!(result.is_ok(), "Failed to load tables: {:?}", result.err());

        let tables = result.unwrap();
        assert_eq!(tables.coverage_tiers.len(), 6);
        assert_eq!(tables.budget_ceilings.len(), 7);
        assert_eq!(tables.budget_ceilings[0].bucket, "below-20k");
        assert_eq!(tables.room_keywords.len(), 4);
    }

    #[test]
    fn test_short_rows_are_rejected() {
        let tiers = read_coverage_tiers(csv::Reader::from_reader("coverage\nbasic\n".as_bytes()));
        assert!(matches!(tiers, Err(TableError::InvalidValue { .. })));

        let ceilings = read_budget_ceilings(csv::Reader::from_reader("bucket,nominal\nbelow-20k,20000\n".as_bytes()));
        assert!(matches!(ceilings, Err(TableError::InvalidValue { .. })));

        let rooms = read_room_keywords(csv::Reader::from_reader("room_type\nprivate\n".as_bytes()));
        assert!(matches!(rooms, Err(TableError::InvalidValue { .. })));
    }

    #[test]
    fn test_read_from_memory() {
        let ceilings =
            read_budget_ceilings(csv::Reader::from_reader("bucket,nominal,ceiling\nsmall,100,150\n".as_bytes()))
                .unwrap();
        assert_eq!(ceilings[0].bucket, "small");
        assert_eq!(ceilings[0].ceiling, 150.0);
    }

    #[test]
    fn test_missing_directory() {
        let result = LoadedTables::load_from(Path::new("data/no-such-tables"));
        assert!(matches!(result, Err(TableError::Io { .. })));
    }
}
