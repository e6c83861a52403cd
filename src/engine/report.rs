use crate::{
    engine::calculator,
    error::PresenceError,
    model::summary::PresenceReport,
    store::{RecordStore, SnapshotVersions},
};
use tracing::{error, info};

/// Reads all three current snapshots and computes every summary in one pass.
/// Either the whole report comes back or an error does.
pub async fn calculate(
    store: &dyn RecordStore,
) -> Result<(SnapshotVersions, PresenceReport), PresenceError> {
    let snapshot = store.snapshot().await.map_err(|e| {
        error!(error = %e, "Failed to read record snapshots");
        PresenceError::Computation(e.to_string())
    })?;

    let report = calculator::compute_report(
        &snapshot.employees,
        &snapshot.access_events,
        &snapshot.leave_events,
    );

    info!(
        total_working_days = report.total_working_days,
        employees = report.summaries.len(),
        access_events = snapshot.access_events.len(),
        leave_events = snapshot.leave_events.len(),
        "Presence calculated"
    );

    Ok((snapshot.versions, report))
}
