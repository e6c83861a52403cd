pub mod memory;
pub mod mysql;

use crate::model::{
    access_event::AccessEvent, employee::EmployeeRecord, leave_event::LeaveEvent,
    source::SourceKind,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed before commit; the transaction was rolled back
    #[error("database error: {0}")]
    Query(#[from] sqlx::Error),

    /// Commit itself failed, the outcome is unknown
    #[error("commit failed: {0}")]
    Commit(sqlx::Error),

    #[error("record store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Whether the previous snapshot of the source is known to be untouched.
    pub fn snapshot_intact(&self) -> bool {
        !matches!(self, StoreError::Commit(_))
    }
}

/// Current snapshot of one source.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub source: SourceKind,
    /// Bumped on every successful replace; 0 means never uploaded
    #[schema(example = 3)]
    pub version: u64,
    #[schema(example = 120)]
    pub record_count: u64,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub replaced_at: Option<DateTime<Utc>>,
}

impl SnapshotInfo {
    pub fn empty(source: SourceKind) -> Self {
        Self {
            source,
            version: 0,
            record_count: 0,
            replaced_at: None,
        }
    }
}

/// One version per source. Equal versions mean equal data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SnapshotVersions {
    pub directory: u64,
    pub access_log: u64,
    pub leave_log: u64,
}

impl SnapshotVersions {
    pub fn set(&mut self, source: SourceKind, version: u64) {
        match source {
            SourceKind::Directory => self.directory = version,
            SourceKind::AccessLog => self.access_log = version,
            SourceKind::LeaveLog => self.leave_log = version,
        }
    }
}

/// All three record sets read at the same point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub versions: SnapshotVersions,
    pub employees: Vec<EmployeeRecord>,
    pub access_events: Vec<AccessEvent>,
    pub leave_events: Vec<LeaveEvent>,
}

/// Durable storage of the canonical records.
///
/// Each `replace_*` swaps the whole record set of one source and leaves the
/// other two alone. There is no transaction spanning sources.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn replace_employees(&self, records: &[EmployeeRecord]) -> Result<SnapshotInfo, StoreError>;

    async fn replace_access_events(&self, records: &[AccessEvent]) -> Result<SnapshotInfo, StoreError>;

    async fn replace_leave_events(&self, records: &[LeaveEvent]) -> Result<SnapshotInfo, StoreError>;

    async fn versions(&self) -> Result<SnapshotVersions, StoreError>;

    async fn snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Per-source info, in `SourceKind` order.
    async fn snapshot_info(&self) -> Result<Vec<SnapshotInfo>, StoreError>;
}
