use crate::model::summary::PresenceSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Columns of the presence table that can be sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortColumn {
    Name,
    Directorate,
    Department,
    LoginCount,
    LeaveCount,
    DaysHome,
    BuildingUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Header-click state: same column flips direction, a new column starts ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn toggle(&mut self, column: SortColumn) -> SortDirection {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
        self.direction
    }
}

enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(summary: &PresenceSummary, column: SortColumn) -> SortKey {
    match column {
        SortColumn::LoginCount => SortKey::Number(summary.login_count as f64),
        SortColumn::LeaveCount => SortKey::Number(summary.leave_count as f64),
        SortColumn::DaysHome => SortKey::Number(summary.days_home as f64),
        SortColumn::BuildingUsage => SortKey::Number(summary.building_usage.value()),
        SortColumn::Name => SortKey::Text(summary.name.to_lowercase()),
        SortColumn::Directorate => SortKey::Text(summary.directorate.to_lowercase()),
        SortColumn::Department => SortKey::Text(summary.department.to_lowercase()),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
        (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        // a single column always yields one kind of key
        _ => Ordering::Equal,
    }
}

/// Reorders in place. The sort is stable in both directions, so ties keep
/// their prior relative order.
pub fn sort(summaries: &mut [PresenceSummary], column: SortColumn, direction: SortDirection) {
    summaries.sort_by(|a, b| {
        let order = compare_keys(&sort_key(a, column), &sort_key(b, column));
        match direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::summary::BuildingUsage;

    fn summary(name: &str, logins: usize, usage: BuildingUsage) -> PresenceSummary {
        PresenceSummary {
            employee_id: name.to_lowercase(),
            name: name.into(),
            directorate: String::new(),
            department: String::new(),
            login_count: logins,
            leave_count: 0,
            days_home: 0,
            building_usage: usage,
        }
    }

    fn names(summaries: &[PresenceSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.name.as_str()).collect()
    }

    fn sample() -> Vec<PresenceSummary> {
        vec![
            summary("carol", 3, BuildingUsage::percent(60.0)),
            summary("Alice", 10, BuildingUsage::NotApplicable),
            summary("bob", 2, BuildingUsage::percent(9.5)),
        ]
    }

    #[test]
    fn test_numeric_columns_sort_by_value() {
        let mut rows = sample();
        sort(&mut rows, SortColumn::LoginCount, SortDirection::Asc);
        assert_eq!(names(&rows), ["bob", "carol", "Alice"]);

        sort(&mut rows, SortColumn::LoginCount, SortDirection::Desc);
        assert_eq!(names(&rows), ["Alice", "carol", "bob"]);
    }

    #[test]
    fn test_usage_sorts_numerically_with_sentinel_as_zero() {
        let mut rows = sample();
        sort(&mut rows, SortColumn::BuildingUsage, SortDirection::Asc);
        // 9.5 must come before 60.0, which a text sort would get wrong
        assert_eq!(names(&rows), ["Alice", "bob", "carol"]);
    }

    #[test]
    fn test_text_columns_ignore_case() {
        let mut rows = sample();
        sort(&mut rows, SortColumn::Name, SortDirection::Asc);
        assert_eq!(names(&rows), ["Alice", "bob", "carol"]);

        sort(&mut rows, SortColumn::Name, SortDirection::Desc);
        assert_eq!(names(&rows), ["carol", "bob", "Alice"]);
    }

    #[test]
    fn test_empty_text_sorts_first() {
        let mut rows = sample();
        rows[2].department = "Web".into();
        rows[0].department = "api".into();
        sort(&mut rows, SortColumn::Department, SortDirection::Asc);
        assert_eq!(names(&rows), ["Alice", "carol", "bob"]);
    }

    #[test]
    fn test_sorting_keeps_the_same_rows() {
        let original = sample();
        let mut rows = original.clone();
        sort(&mut rows, SortColumn::DaysHome, SortDirection::Desc);
        sort(&mut rows, SortColumn::BuildingUsage, SortDirection::Asc);

        assert_eq!(rows.len(), original.len());
        for row in &original {
            assert!(rows.contains(row));
        }
    }

    #[test]
    fn test_ties_keep_prior_order() {
        let mut rows = sample();
        sort(&mut rows, SortColumn::LeaveCount, SortDirection::Asc);
        assert_eq!(names(&rows), ["carol", "Alice", "bob"]);
    }

    #[test]
    fn test_toggle_flips_same_column_and_resets_on_new_column() {
        let mut state = SortState::default();
        assert_eq!(state.toggle(SortColumn::Name), SortDirection::Asc);
        assert_eq!(state.toggle(SortColumn::Name), SortDirection::Desc);
        assert_eq!(state.toggle(SortColumn::Name), SortDirection::Asc);
        assert_eq!(state.toggle(SortColumn::DaysHome), SortDirection::Asc);
        assert_eq!(state.column, Some(SortColumn::DaysHome));
    }

    #[test]
    fn test_column_names_parse() {
        use std::str::FromStr;
        assert_eq!(SortColumn::from_str("buildingUsage").unwrap(), SortColumn::BuildingUsage);
        assert_eq!(SortDirection::from_str("desc").unwrap(), SortDirection::Desc);
        assert!(SortColumn::from_str("salary").is_err());
    }
}
