use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::constants::ALL_REGIONS_LABEL;

/// Which regions a query covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionFilter {
    AllRegions,
    SpecificRegion(String),
}

impl RegionFilter {
    /// Build a filter from a user-facing label. Blank input, `all` and
    /// `All Regions` select every region; anything else is a region name.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty()
            || label.eq_ignore_ascii_case("all")
            || label.eq_ignore_ascii_case(ALL_REGIONS_LABEL)
        {
            RegionFilter::AllRegions
        } else {
            RegionFilter::SpecificRegion(label.to_string())
        }
    }

    /// Case-sensitive exact match on the region name.
    pub fn matches(&self, region: &str) -> bool {
        match self {
            RegionFilter::AllRegions => true,
            RegionFilter::SpecificRegion(name) => name == region,
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            RegionFilter::AllRegions => None,
            RegionFilter::SpecificRegion(name) => Some(name),
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::AllRegions => f.write_str(ALL_REGIONS_LABEL),
            RegionFilter::SpecificRegion(name) => f.write_str(name),
        }
    }
}

/// Trailing window `[start, end)`: the start is inclusive, the end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// A start earlier than the representable range is clamped to
    /// `DateTime::<Utc>::MIN_UTC`.
    pub fn trailing(days: u32, now: DateTime<Utc>) -> Self {
        let start = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts < self.end
    }
}
