use crate::model::{
    employee::directorate_or_unknown,
    summary::{BuildingUsage, PresenceSummary, round_one_decimal},
};
use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UsageTier {
    HighUsage,
    MediumUsage,
    LowUsage,
}

impl UsageTier {
    pub fn classify(average_usage: f64) -> Self {
        if average_usage >= 70.0 {
            UsageTier::HighUsage
        } else if average_usage >= 50.0 {
            UsageTier::MediumUsage
        } else {
            UsageTier::LowUsage
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectorateKpi {
    #[schema(example = "Engineering")]
    pub directorate: String,
    /// Mean usage of the included members, one fractional digit
    #[schema(example = 80.0)]
    pub average_usage: f64,
    #[schema(example = "80.0%")]
    pub usage: String,
    /// Members whose usage entered the average
    #[schema(example = 1)]
    pub included_count: usize,
    #[schema(example = 1)]
    pub member_count: usize,
    pub tier: UsageTier,
}

#[derive(Default)]
struct Group {
    total_usage: f64,
    included: usize,
    members: usize,
}

/// Only a positive usage enters the average.
///
/// A member at exactly 0.0% is treated the same as "N/A". Whether zero should
/// count is still open with the product owners, so keep the behaviour as is.
fn counts_toward_average(usage: &BuildingUsage) -> Option<f64> {
    match usage {
        BuildingUsage::Percent(value) if *value != 0.0 => Some(*value),
        _ => None,
    }
}

/// Average building usage per directorate, keyed (and so ordered) by name.
pub fn aggregate_by_directorate(summaries: &[PresenceSummary]) -> BTreeMap<String, DirectorateKpi> {
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();

    for summary in summaries {
        let group = groups
            .entry(directorate_or_unknown(&summary.directorate))
            .or_default();
        group.members += 1;
        if let Some(value) = counts_toward_average(&summary.building_usage) {
            group.total_usage += value;
            group.included += 1;
        }
    }

    groups
        .into_iter()
        .map(|(directorate, group)| {
            let average = if group.included > 0 {
                group.total_usage / group.included as f64
            } else {
                0.0
            };
            let kpi = DirectorateKpi {
                directorate: directorate.to_string(),
                average_usage: round_one_decimal(average),
                usage: format!("{:.1}%", round_one_decimal(average)),
                included_count: group.included,
                member_count: group.members,
                tier: UsageTier::classify(average),
            };
            (directorate.to_string(), kpi)
        })
        .collect()
}
