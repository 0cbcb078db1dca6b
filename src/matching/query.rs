//! User query and its fixed vocabularies
//!
//! Unknown vocabulary never fails deserialization: labels are matched case
//! insensitively, and anything unrecognised, `null` or of the wrong JSON type
//! maps to an `Unknown` variant, `None`, or is dropped (for covers). It simply
//! contributes nothing to the score.

use crate::plan::{AgeRange, OptionalCover};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Desired coverage bucket chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    Basic,
    Standard,
    Enhanced,
    Premium,
    Executive,
    Royal,
    #[default]
    Unknown,
}

impl CoverageLevel {
    pub const KNOWN: [CoverageLevel; 6] = [
        CoverageLevel::Basic,
        CoverageLevel::Standard,
        CoverageLevel::Enhanced,
        CoverageLevel::Premium,
        CoverageLevel::Executive,
        CoverageLevel::Royal,
    ];

    /// Parse a label, case insensitively
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "basic" => CoverageLevel::Basic,
            "standard" => CoverageLevel::Standard,
            "enhanced" => CoverageLevel::Enhanced,
            "premium" => CoverageLevel::Premium,
            "executive" => CoverageLevel::Executive,
            "royal" => CoverageLevel::Royal,
            _ => CoverageLevel::Unknown,
        }
    }
}

/// Preferred hospital room type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    General,
    Private,
    Deluxe,
    Ensuite,
    #[default]
    Unknown,
}

impl RoomType {
    /// Parse a label, case insensitively
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "general" => RoomType::General,
            "private" => RoomType::Private,
            "deluxe" => RoomType::Deluxe,
            "ensuite" => RoomType::Ensuite,
            _ => RoomType::Unknown,
        }
    }
}

impl OptionalCover {
    /// Parse a cover identifier, case insensitively
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "dental" => Some(OptionalCover::Dental),
            "optical" => Some(OptionalCover::Optical),
            "maternity" => Some(OptionalCover::Maternity),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for CoverageLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_label(deserializer)?
            .map(|label| CoverageLevel::parse(&label))
            .unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for RoomType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_label(deserializer)?
            .map(|label| RoomType::parse(&label))
            .unwrap_or_default())
    }
}

/// Deserialize a free-form label; numbers become their decimal text, anything
/// else that is not a string becomes `None`
pub(crate) fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(label) => Some(label),
        Value::Number(number) => Some(number.to_string()),
        Value::Null => None,
        other => {
            log::debug!("Ignoring non-text query label {}", other);
            None
        }
    })
}

/// Deserialize an age given as a number or numeric string; anything else is
/// ignored
pub(crate) fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(raw) => raw.trim().parse::<u8>().ok(),
        Value::Null => return Ok(None),
        _ => None,
    };
    if age.is_none() {
        log::debug!("Ignoring unusable age in query");
    }
    Ok(age)
}

/// Deserialize cover identifiers, dropping ones we do not know.
/// A missing list, `null` or a non-list value is an empty selection.
pub(crate) fn lenient_covers<'de, D>(deserializer: D) -> Result<BTreeSet<OptionalCover>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::String(label) => vec![Value::String(label)],
        _ => Vec::new(),
    };
    Ok(items
        .iter()
        .filter_map(|item| {
            let cover = item.as_str().and_then(OptionalCover::parse);
            if cover.is_none() {
                log::debug!("Ignoring unknown optional cover {}", item);
            }
            cover
        })
        .collect())
}

/// What the query tells us about the applicant's age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicantAge {
    /// An exact age was given
    Exact(u8),
    /// Only an age bracket was given
    Range(AgeRange),
    /// Nothing usable was given
    Unspecified,
}

/// A single comparison request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub desired_coverage: CoverageLevel,

    /// Budget bucket label, resolved to a ceiling through the scoring tables
    #[serde(default, deserialize_with = "lenient_label")]
    pub budget: Option<String>,

    /// Age bracket descriptor ("65-69")
    #[serde(default, deserialize_with = "lenient_label")]
    pub age_range: Option<String>,

    /// Exact applicant age; takes precedence over `age_range`
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<u8>,

    #[serde(default)]
    pub room_type: RoomType,

    #[serde(default, deserialize_with = "lenient_covers")]
    pub optional_covers: BTreeSet<OptionalCover>,
}

impl UserQuery {
    pub fn applicant(&self) -> ApplicantAge {
        if let Some(age) = self.age {
            return ApplicantAge::Exact(age);
        }
        match self.age_range.as_deref().map(str::parse::<AgeRange>) {
            Some(Ok(range)) => ApplicantAge::Range(range),
            Some(Err(err)) => {
                log::debug!("Ignoring unusable age range in query: {}", err);
                ApplicantAge::Unspecified
            }
            None => ApplicantAge::Unspecified,
        }
    }
}
