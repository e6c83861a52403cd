use super::{RecordStore, Snapshot, SnapshotInfo, SnapshotVersions, StoreError};
use crate::model::{
    access_event::AccessEvent, employee::EmployeeRecord, leave_event::LeaveEvent,
    source::SourceKind,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use strum::IntoEnumIterator;

#[derive(Default)]
struct Tables {
    employees: Vec<EmployeeRecord>,
    access_events: Vec<AccessEvent>,
    leave_events: Vec<LeaveEvent>,
    info: HashMap<SourceKind, SnapshotInfo>,
}

impl Tables {
    fn bump(&mut self, source: SourceKind, record_count: usize) -> SnapshotInfo {
        let info = self
            .info
            .entry(source)
            .or_insert_with(|| SnapshotInfo::empty(source));
        info.version += 1;
        info.record_count = record_count as u64;
        info.replaced_at = Some(Utc::now());
        info.clone()
    }

    fn versions(&self) -> SnapshotVersions {
        let mut versions = SnapshotVersions::default();
        for info in self.info.values() {
            versions.set(info.source, info.version);
        }
        versions
    }
}

/// Process-local store. A replace builds the new vector first and swaps it in
/// under the write lock, so readers see either the old or the new set.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn replace<T: Clone>(
        &self,
        source: SourceKind,
        records: &[T],
        slot: impl FnOnce(&mut Tables) -> &mut Vec<T>,
    ) -> Result<SnapshotInfo, StoreError> {
        let fresh = records.to_vec();
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        *slot(&mut *tables) = fresh;
        Ok(tables.bump(source, records.len()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn replace_employees(&self, records: &[EmployeeRecord]) -> Result<SnapshotInfo, StoreError> {
        self.replace(SourceKind::Directory, records, |t| &mut t.employees)
    }

    async fn replace_access_events(&self, records: &[AccessEvent]) -> Result<SnapshotInfo, StoreError> {
        self.replace(SourceKind::AccessLog, records, |t| &mut t.access_events)
    }

    async fn replace_leave_events(&self, records: &[LeaveEvent]) -> Result<SnapshotInfo, StoreError> {
        self.replace(SourceKind::LeaveLog, records, |t| &mut t.leave_events)
    }

    async fn versions(&self) -> Result<SnapshotVersions, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.versions())
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Snapshot {
            versions: tables.versions(),
            employees: tables.employees.clone(),
            access_events: tables.access_events.clone(),
            leave_events: tables.leave_events.clone(),
        })
    }

    async fn snapshot_info(&self) -> Result<Vec<SnapshotInfo>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(SourceKind::iter()
            .map(|source| {
                tables
                    .info
                    .get(&source)
                    .cloned()
                    .unwrap_or_else(|| SnapshotInfo::empty(source))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: &str) -> EmployeeRecord {
        EmployeeRecord {
            employee_id: id.into(),
            name: String::new(),
            directorate: String::new(),
            department: String::new(),
        }
    }

    fn swipe(id: &str, date: &str) -> AccessEvent {
        AccessEvent {
            employee_id: id.into(),
            date: date.into(),
            time: String::new(),
        }
    }

    #[actix_web::test]
    async fn test_replace_discards_previous_records_of_that_source_only() {
        let store = MemoryRecordStore::new();
        store.replace_employees(&[employee("1"), employee("2")]).await.unwrap();
        store.replace_access_events(&[swipe("1", "d1")]).await.unwrap();

        let info = store.replace_employees(&[employee("3")]).await.unwrap();
        assert_eq!(info.version, 2);
        assert_eq!(info.record_count, 1);

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.employees, vec![employee("3")]);
        assert_eq!(snapshot.access_events, vec![swipe("1", "d1")]);
        assert!(snapshot.leave_events.is_empty());
    }

    #[actix_web::test]
    async fn test_versions_move_independently() {
        let store = MemoryRecordStore::new();
        assert_eq!(store.versions().await.unwrap(), SnapshotVersions::default());

        store.replace_access_events(&[]).await.unwrap();
        store.replace_access_events(&[swipe("1", "d1")]).await.unwrap();
        store.replace_leave_events(&[]).await.unwrap();

        let versions = store.versions().await.unwrap();
        assert_eq!(
            versions,
            SnapshotVersions {
                directory: 0,
                access_log: 2,
                leave_log: 1,
            }
        );
        assert_eq!(store.snapshot().await.unwrap().versions, versions);
    }

    #[actix_web::test]
    async fn test_snapshot_info_lists_every_source() {
        let store = MemoryRecordStore::new();
        store.replace_employees(&[employee("1")]).await.unwrap();

        let info = store.snapshot_info().await.unwrap();
        let sources: Vec<_> = info.iter().map(|i| i.source).collect();
        assert_eq!(
            sources,
            [SourceKind::Directory, SourceKind::AccessLog, SourceKind::LeaveLog]
        );
        assert_eq!(info[0].record_count, 1);
        assert!(info[0].replaced_at.is_some());
        assert_eq!(info[1], SnapshotInfo::empty(SourceKind::AccessLog));
    }
}
