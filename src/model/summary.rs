use serde::{Serialize, Serializer};
use std::fmt;
use utoipa::ToSchema;

/// Share of available working days on which the employee swiped in.
///
/// Percentages are kept rounded to one fractional digit so that every consumer
/// (KPI averaging, sorting, the JSON body) sees the same value that is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuildingUsage {
    Percent(f64),
    /// No working days recorded, or every working day was on leave
    NotApplicable,
}

impl BuildingUsage {
    pub fn percent(value: f64) -> Self {
        BuildingUsage::Percent(round_one_decimal(value))
    }

    /// Leading numeric value; the sentinel counts as zero.
    pub fn value(&self) -> f64 {
        match self {
            BuildingUsage::Percent(v) => *v,
            BuildingUsage::NotApplicable => 0.0,
        }
    }
}

impl fmt::Display for BuildingUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildingUsage::Percent(v) => write!(f, "{:.1}%", v),
            BuildingUsage::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for BuildingUsage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rounds the exact binary value to one decimal, half-way cases away from zero.
/// `0.1499999..` (3 of 2000 days) stays `0.1`.
pub fn round_one_decimal(value: f64) -> f64 {
    let scaled = value * 10.0;
    // only multiples of 0.25 sit exactly on a tie, and for those the product is exact
    if (value * 4.0).fract() == 0.0 && scaled.fract().abs() == 0.5 {
        return scaled.round() / 10.0;
    }
    // `{:.1}` rounds the exact decimal expansion
    format!("{value:.1}").parse().unwrap_or(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSummary {
    #[schema(example = "1001")]
    pub employee_id: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "Engineering")]
    pub directorate: String,
    #[schema(example = "Platform")]
    pub department: String,
    /// Distinct dates with at least one swipe
    #[schema(example = 4)]
    pub login_count: usize,
    /// Distinct dates of approved leave
    #[schema(example = 0)]
    pub leave_count: usize,
    #[schema(example = 1)]
    pub days_home: usize,
    #[schema(value_type = String, example = "80.0%")]
    pub building_usage: BuildingUsage,
}

/// One full calculation pass over the three current snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceReport {
    #[schema(example = 5)]
    pub total_working_days: usize,
    pub summaries: Vec<PresenceSummary>,
}
