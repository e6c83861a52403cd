use super::{RecordStore, Snapshot, SnapshotInfo, SnapshotVersions, StoreError};
use crate::model::{
    access_event::AccessEvent, employee::EmployeeRecord, leave_event::LeaveEvent,
    source::SourceKind,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, MySqlConnection, MySqlPool, QueryBuilder, Transaction};
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Rows per multi-value INSERT
const INSERT_BATCH: usize = 500;

#[derive(FromRow)]
struct SnapshotRow {
    source: String,
    version: u64,
    record_count: u64,
    replaced_at: DateTime<Utc>,
}

impl SnapshotRow {
    fn into_info(self) -> Option<SnapshotInfo> {
        let source = SourceKind::from_str(&self.source).ok()?;
        Some(SnapshotInfo {
            source,
            version: self.version,
            record_count: self.record_count,
            replaced_at: Some(self.replaced_at),
        })
    }
}

/// MySQL-backed store. Every replace runs delete, insert and version bump in
/// one transaction, so a failed upload leaves the previous snapshot in place.
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn begin_replace(
        &self,
        source: SourceKind,
    ) -> Result<Transaction<'static, MySql>, StoreError> {
        let mut tx = self.pool.begin().await?;
        // DELETE rather than TRUNCATE: TRUNCATE commits implicitly
        sqlx::query(&format!("DELETE FROM {}", source.table()))
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn finish_replace(
        mut tx: Transaction<'static, MySql>,
        source: SourceKind,
        record_count: usize,
    ) -> Result<SnapshotInfo, StoreError> {
        let replaced_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO source_snapshots (source, version, record_count, replaced_at)
            VALUES (?, 1, ?, ?)
            ON DUPLICATE KEY UPDATE
                version = version + 1,
                record_count = VALUES(record_count),
                replaced_at = VALUES(replaced_at)
            "#,
        )
        .bind(source.as_ref())
        .bind(record_count as u64)
        .bind(replaced_at)
        .execute(&mut *tx)
        .await?;

        let version = sqlx::query_scalar::<_, u64>(
            "SELECT version FROM source_snapshots WHERE source = ?",
        )
        .bind(source.as_ref())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await.map_err(StoreError::Commit)?;

        Ok(SnapshotInfo {
            source,
            version,
            record_count: record_count as u64,
            replaced_at: Some(replaced_at),
        })
    }

    async fn read_info(conn: &mut MySqlConnection) -> Result<Vec<SnapshotInfo>, StoreError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT source, version, record_count, replaced_at FROM source_snapshots",
        )
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().filter_map(SnapshotRow::into_info).collect())
    }

    fn versions_of(info: &[SnapshotInfo]) -> SnapshotVersions {
        let mut versions = SnapshotVersions::default();
        for i in info {
            versions.set(i.source, i.version);
        }
        versions
    }
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn replace_employees(&self, records: &[EmployeeRecord]) -> Result<SnapshotInfo, StoreError> {
        let mut tx = self.begin_replace(SourceKind::Directory).await?;

        for chunk in records.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
                "INSERT INTO employees (employee_id, name, directorate, department) ",
            );
            qb.push_values(chunk, |mut row, r| {
                row.push_bind(r.employee_id.as_str())
                    .push_bind(r.name.as_str())
                    .push_bind(r.directorate.as_str())
                    .push_bind(r.department.as_str());
            });
            qb.build().execute(&mut *tx).await?;
        }

        Self::finish_replace(tx, SourceKind::Directory, records.len()).await
    }

    async fn replace_access_events(&self, records: &[AccessEvent]) -> Result<SnapshotInfo, StoreError> {
        let mut tx = self.begin_replace(SourceKind::AccessLog).await?;

        for chunk in records.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<MySql> =
                QueryBuilder::new("INSERT INTO card_logins (employee_id, date, time) ");
            qb.push_values(chunk, |mut row, r| {
                row.push_bind(r.employee_id.as_str())
                    .push_bind(r.date.as_str())
                    .push_bind(r.time.as_str());
            });
            qb.build().execute(&mut *tx).await?;
        }

        Self::finish_replace(tx, SourceKind::AccessLog, records.len()).await
    }

    async fn replace_leave_events(&self, records: &[LeaveEvent]) -> Result<SnapshotInfo, StoreError> {
        let mut tx = self.begin_replace(SourceKind::LeaveLog).await?;

        for chunk in records.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<MySql> =
                QueryBuilder::new("INSERT INTO official_leaves (employee_id, date, reason) ");
            qb.push_values(chunk, |mut row, r| {
                row.push_bind(r.employee_id.as_str())
                    .push_bind(r.date.as_str())
                    .push_bind(r.reason.as_str());
            });
            qb.build().execute(&mut *tx).await?;
        }

        Self::finish_replace(tx, SourceKind::LeaveLog, records.len()).await
    }

    async fn versions(&self) -> Result<SnapshotVersions, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let info = Self::read_info(&mut conn).await?;
        Ok(Self::versions_of(&info))
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        // one transaction so all reads see the same committed state
        let mut tx = self.pool.begin().await?;

        let info = Self::read_info(&mut tx).await?;

        let employees = sqlx::query_as::<_, EmployeeRecord>(
            "SELECT employee_id, name, directorate, department FROM employees ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let access_events = sqlx::query_as::<_, AccessEvent>(
            "SELECT employee_id, date, time FROM card_logins ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let leave_events = sqlx::query_as::<_, LeaveEvent>(
            "SELECT employee_id, date, reason FROM official_leaves ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Snapshot {
            versions: Self::versions_of(&info),
            employees,
            access_events,
            leave_events,
        })
    }

    async fn snapshot_info(&self) -> Result<Vec<SnapshotInfo>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let stored = Self::read_info(&mut conn).await?;

        Ok(SourceKind::iter()
            .map(|source| {
                stored
                    .iter()
                    .find(|i| i.source == source)
                    .cloned()
                    .unwrap_or_else(|| SnapshotInfo::empty(source))
            })
            .collect())
    }
}
