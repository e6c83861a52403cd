use crate::{
    engine::normalizer::{Normalized, RawRow, normalize},
    error::PresenceError,
    model::{
        access_event::AccessEvent, employee::EmployeeRecord, leave_event::LeaveEvent,
        source::SourceKind,
    },
    store::{RecordStore, SnapshotInfo, StoreError},
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of one upload, returned to the caller instead of kept as state.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    #[schema(example = true)]
    pub success: bool,
    pub source: SourceKind,
    #[schema(example = "0b7c1f1e-3c4d-4f43-9a53-3f4f7c3a9d11")]
    pub ingestion_id: String,
    /// Records now stored for this source
    #[schema(example = 120)]
    pub record_count: usize,
    /// Rows skipped for lack of an employee identifier
    #[schema(example = 2)]
    pub dropped_count: usize,
    /// Directory rows repeating an already seen employee id
    #[schema(example = 0)]
    pub duplicate_count: usize,
    #[schema(example = 4)]
    pub version: u64,
}

/// Keeps the first directory row per employee id.
fn dedupe_employees(records: Vec<EmployeeRecord>) -> (Vec<EmployeeRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::new();
    let unique: Vec<_> = records
        .into_iter()
        .filter(|r| seen.insert(r.employee_id.clone()))
        .collect();
    let duplicates = before - unique.len();
    (unique, duplicates)
}

/// Normalizes `rows` and replaces the whole record set of `source`.
/// The other two sources are never touched.
pub async fn ingest(
    store: &dyn RecordStore,
    source: SourceKind,
    rows: &[RawRow],
) -> Result<IngestionResult, PresenceError> {
    let ingestion_id = Uuid::new_v4().to_string();

    let (stored, dropped, duplicates) = match source {
        SourceKind::Directory => {
            let Normalized { records, dropped } = normalize::<EmployeeRecord>(rows);
            let (records, duplicates) = dedupe_employees(records);
            if duplicates > 0 {
                warn!(%ingestion_id, duplicates, "Duplicate employee ids skipped");
            }
            let info = store.replace_employees(&records).await;
            (info, dropped, duplicates)
        }
        SourceKind::AccessLog => {
            let Normalized { records, dropped } = normalize::<AccessEvent>(rows);
            (store.replace_access_events(&records).await, dropped, 0)
        }
        SourceKind::LeaveLog => {
            let Normalized { records, dropped } = normalize::<LeaveEvent>(rows);
            (store.replace_leave_events(&records).await, dropped, 0)
        }
    };

    let info: SnapshotInfo = stored.map_err(|e: StoreError| {
        error!(
            %source,
            %ingestion_id,
            error = %e,
            snapshot_intact = e.snapshot_intact(),
            "Failed to replace records"
        );
        PresenceError::Persistence {
            dataset: source,
            cause: e.to_string(),
            snapshot_intact: e.snapshot_intact(),
        }
    })?;

    info!(
        %source,
        %ingestion_id,
        records = info.record_count,
        dropped,
        duplicates,
        version = info.version,
        "Records replaced"
    );

    Ok(IngestionResult {
        success: true,
        source,
        ingestion_id,
        record_count: info.record_count as usize,
        dropped_count: dropped,
        duplicate_count: duplicates,
        version: info.version,
    })
}
