//! Durable snapshot log.
//!
//! One SQLite table keyed by the snapshot timestamp text. Writes are single
//! `INSERT OR REPLACE` / `DELETE` statements in autocommit mode, so a reader
//! never sees a partially written row.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use thiserror::Error;
use tracing::{info, warn};

use crate::system::snapshot::{MetricSnapshot, parse_timestamp};

pub const TABLE_NAME: &str = "system_logs";

/// Column order of the table and of the CSV export.
pub const COLUMNS: [&str; 6] = [
    "timestamp",
    "cpu_percent",
    "ram_percent",
    "ram_used_gb",
    "bytes_sent_gb",
    "bytes_recv_gb",
];

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS system_logs (
    timestamp TEXT PRIMARY KEY,
    cpu_percent REAL,
    ram_percent REAL,
    ram_used_gb REAL,
    bytes_sent_gb REAL,
    bytes_recv_gb REAL
)";

const UPSERT: &str = "INSERT OR REPLACE INTO system_logs
    (timestamp, cpu_percent, ram_percent, ram_used_gb, bytes_sent_gb, bytes_recv_gb)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const SELECT_ALL: &str = "SELECT timestamp, cpu_percent, ram_percent, ram_used_gb,
    bytes_sent_gb, bytes_recv_gb FROM system_logs ORDER BY timestamp ASC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The store could not be created; it is unusable.
    IoFailure,
    /// A single write did not happen; the store is still usable.
    WriteFailure,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot open log database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{op} failed: {source}")]
    Write {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("log store is closed")]
    Closed,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::CreateDir { .. } | StoreError::Open { .. } => StoreErrorKind::IoFailure,
            StoreError::Write { .. } | StoreError::Closed => StoreErrorKind::WriteFailure,
        }
    }
}

#[derive(Debug)]
pub struct LogStore {
    conn: Option<Connection>,
    path: PathBuf,
}

impl LogStore {
    /// Create `dir` if needed, then open or create `dir/file_name` and make
    /// sure the table exists.
    pub fn open(dir: &Path, file_name: &str) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(file_name);
        let conn = Connection::open(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        let store = Self::with_schema(conn, path)?;
        info!(path = %store.path.display(), "log store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        Self::with_schema(conn, path)
    }

    fn with_schema(conn: Connection, path: PathBuf) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(LogStore {
            conn: Some(conn),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn upsert(&self, snapshot: &MetricSnapshot) -> Result<(), StoreError> {
        let conn = self.conn.as_ref().ok_or(StoreError::Closed)?;
        conn.execute(
            UPSERT,
            params![
                snapshot.timestamp_text(),
                snapshot.cpu_percent,
                snapshot.ram_percent,
                snapshot.ram_used_gb,
                snapshot.bytes_sent_gb,
                snapshot.bytes_recv_gb,
            ],
        )
        .map_err(|source| StoreError::Write {
            op: "upsert",
            source,
        })?;
        Ok(())
    }

    /// Every stored row, oldest first. Failures are logged and read as empty.
    pub fn list_all(&self) -> Vec<MetricSnapshot> {
        let Some(conn) = self.conn.as_ref() else {
            warn!("list_all on a closed log store");
            return Vec::new();
        };
        match query_all(conn) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%err, "failed to read log rows");
                Vec::new()
            }
        }
    }

    pub fn clear_all(&self) -> Result<(), StoreError> {
        let conn = self.conn.as_ref().ok_or(StoreError::Closed)?;
        let removed = conn
            .execute("DELETE FROM system_logs", [])
            .map_err(|source| StoreError::Write {
                op: "clear",
                source,
            })?;
        info!(removed, "log store cleared");
        Ok(())
    }

    pub fn len(&self) -> usize {
        let Some(conn) = self.conn.as_ref() else {
            return 0;
        };
        conn.query_row("SELECT COUNT(*) FROM system_logs", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| usize::try_from(n).unwrap_or(0))
        .unwrap_or_else(|err| {
            warn!(%err, "failed to count log rows");
            0
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the database handle. Safe to call more than once.
    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        match conn.close() {
            Ok(()) => info!(path = %self.path.display(), "log store closed"),
            Err((_, err)) => warn!(%err, path = %self.path.display(), "log store close failed"),
        }
    }
}

impl Drop for LogStore {
    fn drop(&mut self) {
        self.close();
    }
}

fn query_all(conn: &Connection) -> rusqlite::Result<Vec<MetricSnapshot>> {
    let mut stmt = conn.prepare(SELECT_ALL)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, f64>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, f64>(4)?,
            row.get::<_, f64>(5)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (text, cpu_percent, ram_percent, ram_used_gb, bytes_sent_gb, bytes_recv_gb) =
            match row {
                Ok(values) => values,
                Err(err) => {
                    warn!(%err, "skipping unreadable log row");
                    continue;
                }
            };
        let Some(timestamp) = parse_timestamp(&text) else {
            warn!(timestamp = %text, "skipping log row with malformed timestamp");
            continue;
        };
        out.push(MetricSnapshot {
            timestamp,
            cpu_percent,
            ram_percent,
            ram_used_gb,
            bytes_sent_gb,
            bytes_recv_gb,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ts: &str, cpu: f64) -> MetricSnapshot {
        MetricSnapshot {
            timestamp: parse_timestamp(ts).unwrap(),
            cpu_percent: cpu,
            ram_percent: 40.0,
            ram_used_gb: 3.5,
            bytes_sent_gb: 0.25,
            bytes_recv_gb: 1.75,
        }
    }

    #[test]
    fn empty_store_lists_nothing() {
        let store = LogStore::open_in_memory().unwrap();
        assert!(store.list_all().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn upsert_replaces_same_timestamp() {
        let store = LogStore::open_in_memory().unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:00", 1.0)).unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:00", 2.0)).unwrap();
        let rows = store.list_all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cpu_percent, 2.0);
    }

    #[test]
    fn list_is_ordered_by_timestamp() {
        let store = LogStore::open_in_memory().unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:02", 3.0)).unwrap();
        store.upsert(&snapshot("2025-06-30 11:59:59", 1.0)).unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:00", 2.0)).unwrap();
        let cpus: Vec<f64> = store.list_all().iter().map(|s| s.cpu_percent).collect();
        assert_eq!(cpus, vec![1.0, 2.0, 3.0]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn clear_removes_everything() {
        let store = LogStore::open_in_memory().unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:00", 1.0)).unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:01", 1.0)).unwrap();
        store.clear_all().unwrap();
        assert!(store.list_all().is_empty());
        store.clear_all().unwrap();
    }

    #[test]
    fn close_is_idempotent_and_blocks_writes() {
        let mut store = LogStore::open_in_memory().unwrap();
        store.close();
        store.close();
        assert!(!store.is_open());
        let err = store
            .upsert(&snapshot("2025-06-30 12:00:00", 1.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Closed));
        assert_eq!(err.kind(), StoreErrorKind::WriteFailure);
        assert!(store.clear_all().is_err());
        assert!(store.list_all().is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let store = LogStore::open_in_memory().unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:00", 1.0)).unwrap();
        store
            .conn
            .as_ref()
            .unwrap()
            .execute(
                "INSERT INTO system_logs VALUES ('not a time', 1, 1, 1, 1, 1)",
                [],
            )
            .unwrap();
        let rows = store.list_all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp_text(), "2025-06-30 12:00:00");
    }

    #[test]
    fn null_metric_rows_are_skipped() {
        let store = LogStore::open_in_memory().unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:00", 1.0)).unwrap();
        store.upsert(&snapshot("2025-06-30 12:00:01", 2.0)).unwrap();
        store
            .conn
            .as_ref()
            .unwrap()
            .execute(
                "INSERT INTO system_logs VALUES ('2025-06-30 12:00:02', NULL, 1, 1, 1, 1)",
                [],
            )
            .unwrap();
        assert_eq!(store.len(), 3);
        let cpus: Vec<f64> = store.list_all().iter().map(|s| s.cpu_percent).collect();
        assert_eq!(cpus, vec![1.0, 2.0]);
    }

    #[test]
    fn schema_columns_match_export_order() {
        let store = LogStore::open_in_memory().unwrap();
        let conn = store.conn.as_ref().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT name, type, pk FROM pragma_table_info('{TABLE_NAME}')"
            ))
            .unwrap();
        let cols: Vec<(String, String, i64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let names: Vec<&str> = cols.iter().map(|c| c.0.as_str()).collect();
        assert_eq!(names, COLUMNS);
        assert_eq!(cols[0].1, "TEXT");
        assert_eq!(cols[0].2, 1);
        assert!(cols[1..].iter().all(|c| c.1 == "REAL" && c.2 == 0));
    }
}
