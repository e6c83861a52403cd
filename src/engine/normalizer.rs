use crate::model::{
    access_event::AccessEvent, employee::EmployeeRecord, leave_event::LeaveEvent,
    source::SourceKind,
};
use std::collections::HashMap;

/// One spreadsheet row: header text -> cell text.
pub type RawRow = HashMap<String, String>;

/// Accepted column names per logical field, in priority order.
pub mod aliases {
    pub const DIRECTORY_ID: &[&str] = &["id", "employeeId", "employee_id"];
    pub const DIRECTORY_NAME: &[&str] = &["name", "employeeName", "employee_name"];
    // "directoriate" shows up in real exports
    pub const DIRECTORY_DIRECTORATE: &[&str] = &["directorate", "directoriate"];
    pub const DIRECTORY_DEPARTMENT: &[&str] = &["department"];

    pub const EVENT_ID: &[&str] = &["employeeId", "employee_id", "id"];
    pub const EVENT_DATE: &[&str] = &["date"];
    pub const ACCESS_TIME: &[&str] = &["time"];
    pub const LEAVE_REASON: &[&str] = &["reason"];
}

/// First alias carrying a non-blank value wins. Values come back trimmed.
pub fn resolve<'r>(row: &'r RawRow, aliases: &[&str]) -> Option<&'r str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn resolve_or_empty(row: &RawRow, aliases: &[&str]) -> String {
    resolve(row, aliases).unwrap_or_default().to_string()
}

/// A record type that can be built from a raw row of its source.
pub trait Canonical: Sized {
    const SOURCE: SourceKind;

    /// `None` when the row has no usable employee identifier.
    fn from_raw(row: &RawRow) -> Option<Self>;
}

impl Canonical for EmployeeRecord {
    const SOURCE: SourceKind = SourceKind::Directory;

    fn from_raw(row: &RawRow) -> Option<Self> {
        let employee_id = resolve(row, aliases::DIRECTORY_ID)?;
        Some(EmployeeRecord {
            employee_id: employee_id.to_string(),
            name: resolve_or_empty(row, aliases::DIRECTORY_NAME),
            directorate: resolve_or_empty(row, aliases::DIRECTORY_DIRECTORATE),
            department: resolve_or_empty(row, aliases::DIRECTORY_DEPARTMENT),
        })
    }
}

impl Canonical for AccessEvent {
    const SOURCE: SourceKind = SourceKind::AccessLog;

    fn from_raw(row: &RawRow) -> Option<Self> {
        let employee_id = resolve(row, aliases::EVENT_ID)?;
        Some(AccessEvent {
            employee_id: employee_id.to_string(),
            date: resolve_or_empty(row, aliases::EVENT_DATE),
            time: resolve_or_empty(row, aliases::ACCESS_TIME),
        })
    }
}

impl Canonical for LeaveEvent {
    const SOURCE: SourceKind = SourceKind::LeaveLog;

    fn from_raw(row: &RawRow) -> Option<Self> {
        let employee_id = resolve(row, aliases::EVENT_ID)?;
        Some(LeaveEvent {
            employee_id: employee_id.to_string(),
            date: resolve_or_empty(row, aliases::EVENT_DATE),
            reason: resolve_or_empty(row, aliases::LEAVE_REASON),
        })
    }
}

#[derive(Debug)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

/// Converts raw rows into canonical records, preserving row order.
/// Rows without an identifier are skipped and counted, never rejected.
pub fn normalize<T: Canonical>(rows: &[RawRow]) -> Normalized<T> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0;

    for row in rows {
        match T::from_raw(row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        let source = T::SOURCE;
        tracing::warn!(%source, dropped, "Rows without employee identifier skipped");
    }

    Normalized { records, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_non_empty_alias_wins() {
        let r = row(&[("employee_id", "E-3"), ("employeeId", "E-2"), ("id", "")]);
        assert_eq!(resolve(&r, aliases::DIRECTORY_ID), Some("E-2"));
        assert_eq!(resolve(&r, aliases::EVENT_ID), Some("E-2"));

        let r = row(&[("id", "   "), ("employee_id", "E-9")]);
        assert_eq!(resolve(&r, aliases::DIRECTORY_ID), Some("E-9"));
    }

    #[test]
    fn test_directory_row_uses_aliases_and_defaults() {
        let rows = vec![
            row(&[("employee_id", "7"), ("employee_name", "Ann"), ("directoriate", "Ops")]),
            row(&[("id", "8"), ("name", "Bob"), ("directorate", "Eng"), ("department", "Web")]),
        ];
        let out = normalize::<EmployeeRecord>(&rows);

        assert_eq!(out.dropped, 0);
        assert_eq!(
            out.records[0],
            EmployeeRecord {
                employee_id: "7".into(),
                name: "Ann".into(),
                directorate: "Ops".into(),
                department: String::new(),
            }
        );
        assert_eq!(out.records[1].directorate, "Eng");
        assert_eq!(out.records[1].department, "Web");
    }

    #[test]
    fn test_directorate_prefers_correct_spelling() {
        let r = row(&[("id", "1"), ("directorate", "Finance"), ("directoriate", "Typo")]);
        let rec = EmployeeRecord::from_raw(&r).unwrap();
        assert_eq!(rec.directorate, "Finance");
        assert_eq!(rec.directorate_or_unknown(), "Finance");

        let r = row(&[("id", "2")]);
        let rec = EmployeeRecord::from_raw(&r).unwrap();
        assert_eq!(rec.directorate, "");
        assert_eq!(rec.directorate_or_unknown(), "Unknown");
    }

    #[test]
    fn test_rows_without_identifier_are_dropped_and_counted() {
        let rows = vec![
            row(&[("id", "1"), ("name", "A")]),
            row(&[("name", "No id")]),
            row(&[("id", ""), ("name", "Blank id")]),
            row(&[("id", "4"), ("name", "D")]),
        ];
        let out = normalize::<EmployeeRecord>(&rows);

        assert_eq!(out.dropped, 2);
        let ids: Vec<_> = out.records.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);
    }

    #[test]
    fn test_event_rows_keep_order_and_duplicates() {
        let rows = vec![
            row(&[("employeeId", "1"), ("date", "2024-03-01"), ("time", "08:59")]),
            row(&[("employeeId", "1"), ("date", "2024-03-01")]),
            row(&[("id", "2")]),
        ];
        let out = normalize::<AccessEvent>(&rows);

        assert_eq!(out.dropped, 0);
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].time, "08:59");
        assert_eq!(out.records[1].time, "");
        assert_eq!(out.records[2].employee_id, "2");
        assert_eq!(out.records[2].date, "");
    }

    #[test]
    fn test_leave_rows_resolve_reason() {
        let rows = vec![
            row(&[("employee_id", "5"), ("date", "2024-03-04"), ("reason", "Training")]),
            row(&[("date", "2024-03-05"), ("reason", "orphan without id")]),
        ];
        let out = normalize::<LeaveEvent>(&rows);

        assert_eq!(out.dropped, 1);
        assert_eq!(out.records[0].reason, "Training");
        assert_eq!(out.records[0].date, "2024-03-04");
    }
}
