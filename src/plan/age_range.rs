//! Age range descriptors and age-bracketed premium tables
//!
//! A descriptor is one of:
//! - `"min-max"`: inclusive on both ends
//! - `"min+"`: open ended, any age at or above `min`
//! - `"age"`: a single exact age
//!
//! Tables keep their bands sorted by lower bound so lookups never depend on
//! the iteration order of whatever mapping the data arrived in.

use crate::error::AgeRangeError;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A parsed age range descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeRange {
    /// `"min-max"`, both bounds inclusive
    Between { min: u8, max: u8 },
    /// `"min+"`
    AtLeast { min: u8 },
    /// `"age"`
    Exact { age: u8 },
}

impl AgeRange {
    /// Lowest age covered by the range
    pub fn lower_bound(&self) -> u8 {
        match *self {
            AgeRange::Between { min, .. } => min,
            AgeRange::AtLeast { min } => min,
            AgeRange::Exact { age } => age,
        }
    }

    /// Highest age covered, `None` when open ended
    pub fn upper_bound(&self) -> Option<u8> {
        match *self {
            AgeRange::Between { max, .. } => Some(max),
            AgeRange::AtLeast { .. } => None,
            AgeRange::Exact { age } => Some(age),
        }
    }

    pub fn contains(&self, age: u8) -> bool {
        match *self {
            AgeRange::Between { min, max } => min <= age && age <= max,
            AgeRange::AtLeast { min } => age >= min,
            AgeRange::Exact { age: exact } => age == exact,
        }
    }
}

impl FromStr for AgeRange {
    type Err = AgeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || AgeRangeError::InvalidDescriptor(s.to_string());

        if let Some(min) = trimmed.strip_suffix('+') {
            let min = min.trim().parse::<u8>().map_err(|_| invalid())?;
            return Ok(AgeRange::AtLeast { min });
        }

        if let Some((min, max)) = trimmed.split_once('-') {
            let min = min.trim().parse::<u8>().map_err(|_| invalid())?;
            let max = max.trim().parse::<u8>().map_err(|_| invalid())?;
            if min > max {
                return Err(AgeRangeError::Inverted {
                    descriptor: s.to_string(),
                });
            }
            return Ok(AgeRange::Between { min, max });
        }

        let age = trimmed.parse::<u8>().map_err(|_| invalid())?;
        Ok(AgeRange::Exact { age })
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AgeRange::Between { min, max } => write!(f, "{}-{}", min, max),
            AgeRange::AtLeast { min } => write!(f, "{}+", min),
            AgeRange::Exact { age } => write!(f, "{}", age),
        }
    }
}

impl Serialize for AgeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgeRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of an age-bracketed premium table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBand {
    pub range: AgeRange,
    pub premium: f64,
}

/// Age-bracketed annual premiums for a single plan
///
/// Bands are ordered by ascending lower bound. Overlapping bands are kept as
/// supplied; the first band (in that order) containing an age wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgeRangeTable {
    bands: Vec<AgeBand>,
}

impl AgeRangeTable {
    /// Build a table from already-parsed bands
    pub fn new(mut bands: Vec<AgeBand>) -> Self {
        // Stable sort: bands sharing a lower bound keep their supplied order
        bands.sort_by_key(|band| band.range.lower_bound());
        Self { bands }
    }

    /// Parse a descriptor → premium mapping
    ///
    /// Any bad descriptor or premium fails the whole table.
    pub fn from_map<'a, I>(entries: I) -> Result<Self, AgeRangeError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut bands = Vec::new();
        for (descriptor, premium) in entries {
            let range: AgeRange = descriptor.parse()?;
            if !premium.is_finite() || premium < 0.0 {
                return Err(AgeRangeError::InvalidPremium {
                    descriptor: descriptor.to_string(),
                    premium,
                });
            }
            bands.push(AgeBand { range, premium });
        }
        Ok(Self::new(bands))
    }

    /// Parse a table stored as a serialized JSON mapping
    pub fn from_json_str(raw: &str) -> Result<Self, AgeRangeError> {
        let map: BTreeMap<String, f64> =
            serde_json::from_str(raw).map_err(|e| AgeRangeError::NotAMapping(e.to_string()))?;
        Self::from_map(map.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Parse a table from an already-decoded JSON value.
    /// Accepts either an object or a string holding a serialized object.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, AgeRangeError> {
        match value {
            serde_json::Value::String(raw) => Self::from_json_str(raw),
            serde_json::Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (descriptor, premium) in map {
                    let amount = premium.as_f64().ok_or_else(|| {
                        AgeRangeError::NotAMapping(format!(
                            "premium for {:?} is not a number",
                            descriptor
                        ))
                    })?;
                    entries.push((descriptor.as_str(), amount));
                }
                Self::from_map(entries)
            }
            other => Err(AgeRangeError::NotAMapping(format!(
                "expected object or string, found {}",
                other
            ))),
        }
    }

    /// Bands in ascending lower-bound order
    pub fn bands(&self) -> &[AgeBand] {
        &self.bands
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Premium of the first band containing `age`
    pub fn lookup(&self, age: u8) -> Option<f64> {
        self.bands
            .iter()
            .find(|band| band.range.contains(age))
            .map(|band| band.premium)
    }

    /// Premium of the band with exactly this descriptor
    pub fn lookup_range(&self, range: &AgeRange) -> Option<f64> {
        self.bands
            .iter()
            .find(|band| band.range == *range)
            .map(|band| band.premium)
    }

    /// First band in ascending lower-bound order
    pub fn first(&self) -> Option<&AgeBand> {
        self.bands.first()
    }

    /// Cheapest premium across all bands
    pub fn min_premium(&self) -> Option<f64> {
        self.bands.iter().map(|band| band.premium).reduce(f64::min)
    }

    /// Most expensive premium across all bands
    pub fn max_premium(&self) -> Option<f64> {
        self.bands.iter().map(|band| band.premium).reduce(f64::max)
    }
}

impl Serialize for AgeRangeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bands.len()))?;
        for band in &self.bands {
            map.serialize_entry(&band.range.to_string(), &band.premium)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AgeRangeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = AgeRangeTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of age range descriptor to premium")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, f64)> = Vec::new();
                while let Some((descriptor, premium)) = access.next_entry::<String, f64>()? {
                    entries.push((descriptor, premium));
                }
                AgeRangeTable::from_map(entries.iter().map(|(k, v)| (k.as_str(), *v)))
                    .map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn senior_table() -> AgeRangeTable {
        AgeRangeTable::from_map([
            ("75-79", 72441.0),
            ("65-69", 57952.0),
            ("70-74", 68819.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_descriptors() {
        assert_eq!("65-69".parse::<AgeRange>().unwrap(), AgeRange::Between { min: 65, max: 69 });
        assert_eq!("86+".parse::<AgeRange>().unwrap(), AgeRange::AtLeast { min: 86 });
        assert_eq!("18".parse::<AgeRange>().unwrap(), AgeRange::Exact { age: 18 });
        assert_eq!(" 71 - 85 ".parse::<AgeRange>().unwrap(), AgeRange::Between { min: 71, max: 85 });
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("abc".parse::<AgeRange>(), Err(AgeRangeError::InvalidDescriptor(_))));
        assert!(matches!("60-".parse::<AgeRange>(), Err(AgeRangeError::InvalidDescriptor(_))));
        assert!(matches!("+".parse::<AgeRange>(), Err(AgeRangeError::InvalidDescriptor(_))));
        assert!(matches!("300".parse::<AgeRange>(), Err(AgeRangeError::InvalidDescriptor(_))));
        assert!(matches!("70-65".parse::<AgeRange>(), Err(AgeRangeError::Inverted { .. })));
    }

    #[test]
    fn test_contains_bounds() {
        let range = AgeRange::Between { min: 71, max: 85 };
        assert!(!range.contains(70));
        assert!(range.contains(71));
        assert!(range.contains(85));
        assert!(!range.contains(86));

        assert!(AgeRange::AtLeast { min: 86 }.contains(120));
        assert!(!AgeRange::AtLeast { min: 86 }.contains(85));

        assert!(AgeRange::Exact { age: 40 }.contains(40));
        assert!(!AgeRange::Exact { age: 40 }.contains(41));
    }

    #[test]
    fn test_bands_sorted_by_lower_bound() {
        let table = senior_table();
        let lowers: Vec<u8> = table.bands().iter().map(|b| b.range.lower_bound()).collect();
        assert_eq!(lowers, vec![65, 70, 75]);
        assert_eq!(table.first().unwrap().premium, 57952.0);
    }

    #[test]
    fn test_overlap_first_lower_bound_wins() {
        // Supplied out of order and overlapping at 60-64
        let table = AgeRangeTable::from_map([("60+", 90000.0), ("55-64", 70000.0)]).unwrap();
        assert_eq!(table.lookup(62), Some(70000.0));
        assert_eq!(table.lookup(65), Some(90000.0));
    }

    #[test]
    fn test_min_max_premium() {
        let table = senior_table();
        assert_eq!(table.min_premium(), Some(57952.0));
        assert_eq!(table.max_premium(), Some(72441.0));
        assert_eq!(AgeRangeTable::default().min_premium(), None);
    }

    #[test]
    fn test_rejects_negative_premium() {
        let result = AgeRangeTable::from_map([("18-30", -1.0)]);
        assert!(matches!(result, Err(AgeRangeError::InvalidPremium { .. })));
    }

    #[test]
    fn test_from_serialized_string() {
        let value = serde_json::Value::String(r#"{"18-35": 12000, "36+": 18000}"#.to_string());
        let table = AgeRangeTable::from_json_value(&value).unwrap();
        assert_eq!(table.lookup(20), Some(12000.0));
        assert_eq!(table.lookup(50), Some(18000.0));

        let broken = serde_json::Value::String("{not json".to_string());
        assert!(matches!(
            AgeRangeTable::from_json_value(&broken),
            Err(AgeRangeError::NotAMapping(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_pairs() {
        let table = AgeRangeTable::from_map([
            ("86+", 140000.0),
            ("18", 9000.0),
            ("19-35", 12500.5),
            ("36-85", 30000.0),
        ])
        .unwrap();

        let json = serde_json::to_string(&table).unwrap();
        let back: AgeRangeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);

        // Serialized in ascending lower-bound order
        assert_eq!(json, r#"{"18":9000.0,"19-35":12500.5,"36-85":30000.0,"86+":140000.0}"#);
    }
}
