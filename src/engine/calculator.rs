use crate::model::{
    access_event::AccessEvent,
    employee::EmployeeRecord,
    leave_event::LeaveEvent,
    summary::{BuildingUsage, PresenceReport, PresenceSummary},
};
use std::collections::{HashMap, HashSet};

/// Working days are the distinct dates on which anybody swiped in,
/// orphaned swipes included.
pub fn total_working_days(access: &[AccessEvent]) -> usize {
    access
        .iter()
        .map(|event| event.date.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Presence figures for one employee. Repeated dates count once.
///
/// `days_home` is clamped at zero: a swipe on a leave day is counted on both
/// sides, so the three figures are not a partition of the working days.
pub fn compute_summary<'a>(
    employee: &EmployeeRecord,
    access_dates: impl IntoIterator<Item = &'a str>,
    leave_dates: impl IntoIterator<Item = &'a str>,
    total_working_days: usize,
) -> PresenceSummary {
    let login_count = access_dates.into_iter().collect::<HashSet<_>>().len();
    let leave_count = leave_dates.into_iter().collect::<HashSet<_>>().len();

    let days_home = total_working_days
        .saturating_sub(login_count)
        .saturating_sub(leave_count);

    let available_days = total_working_days as i64 - leave_count as i64;
    let building_usage = if total_working_days == 0 || available_days <= 0 {
        BuildingUsage::NotApplicable
    } else {
        BuildingUsage::percent(login_count as f64 / available_days as f64 * 100.0)
    };

    PresenceSummary {
        employee_id: employee.employee_id.clone(),
        name: employee.name.clone(),
        directorate: employee.directorate_or_unknown().to_string(),
        department: employee.department.clone(),
        login_count,
        leave_count,
        days_home,
        building_usage,
    }
}

/// Dates per employee id.
fn index_dates<'a, T>(
    events: &'a [T],
    key: impl Fn(&'a T) -> (&'a str, &'a str),
) -> HashMap<&'a str, Vec<&'a str>> {
    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    for event in events {
        let (employee_id, date) = key(event);
        index.entry(employee_id).or_default().push(date);
    }
    index
}

/// Left join from the directory into both event sets. Events naming an
/// employee that is not in the directory never reach a summary.
pub fn compute_report(
    employees: &[EmployeeRecord],
    access: &[AccessEvent],
    leave: &[LeaveEvent],
) -> PresenceReport {
    let total_working_days = total_working_days(access);

    let access_by_employee = index_dates(access, |e| (e.employee_id.as_str(), e.date.as_str()));
    let leave_by_employee = index_dates(leave, |e| (e.employee_id.as_str(), e.date.as_str()));

    let summaries = employees
        .iter()
        .map(|employee| {
            let id = employee.employee_id.as_str();
            compute_summary(
                employee,
                access_by_employee.get(id).into_iter().flatten().copied(),
                leave_by_employee.get(id).into_iter().flatten().copied(),
                total_working_days,
            )
        })
        .collect();

    PresenceReport {
        total_working_days,
        summaries,
    }
}
