use crate::{
    engine::report,
    error::PresenceError,
    model::summary::PresenceReport,
    store::{RecordStore, SnapshotVersions},
};
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

/// Computed reports keyed by the source versions they were built from.
/// An upload bumps a version, so stale entries are simply never hit again.
#[derive(Clone)]
pub struct ReportCache {
    reports: Cache<SnapshotVersions, Arc<PresenceReport>>,
}

impl ReportCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            reports: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Returns the report for the current snapshots, computing it at most once
    /// per version triple.
    pub async fn get_or_calculate(
        &self,
        store: &dyn RecordStore,
    ) -> Result<Arc<PresenceReport>, PresenceError> {
        let versions = store
            .versions()
            .await
            .map_err(|e| PresenceError::Computation(e.to_string()))?;

        if let Some(report) = self.reports.get(&versions).await {
            debug!(?versions, "Report cache hit");
            return Ok(report);
        }

        // keyed by what was actually read, which may be newer than `versions`
        let (read_versions, report) = report::calculate(store).await?;
        let report = Arc::new(report);
        self.reports.insert(read_versions, report.clone()).await;
        Ok(report)
    }
}
