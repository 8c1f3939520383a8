use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use pcdiag::store::{LogStore, StoreError, StoreErrorKind};
use pcdiag::system::snapshot::{MetricSnapshot, parse_timestamp};

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 30)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn snapshot_at(timestamp: NaiveDateTime, cpu: f64) -> MetricSnapshot {
    MetricSnapshot {
        timestamp,
        cpu_percent: cpu,
        ram_percent: 20.5,
        ram_used_gb: 3.2,
        bytes_sent_gb: 1.1,
        bytes_recv_gb: 2.2,
    }
}

fn as_tuple(s: &MetricSnapshot) -> (String, f64, f64, f64, f64, f64) {
    (
        s.timestamp_text(),
        s.cpu_percent,
        s.ram_percent,
        s.ram_used_gb,
        s.bytes_sent_gb,
        s.bytes_recv_gb,
    )
}

#[test]
fn open_upsert_list_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("tmp");
    let store = LogStore::open(&dir, "m.db").unwrap();
    assert!(dir.join("m.db").exists());

    let snapshot = MetricSnapshot {
        timestamp: parse_timestamp("2025-06-30 12:00:00").unwrap(),
        cpu_percent: 10.5,
        ram_percent: 20.5,
        ram_used_gb: 3.2,
        bytes_sent_gb: 1.1,
        bytes_recv_gb: 2.2,
    };
    store.upsert(&snapshot).unwrap();

    let rows: Vec<_> = store.list_all().iter().map(as_tuple).collect();
    assert_eq!(
        rows,
        vec![("2025-06-30 12:00:00".to_string(), 10.5, 20.5, 3.2, 1.1, 2.2)]
    );
}

#[test]
fn rows_survive_reopen() {
    let root = tempfile::tempdir().unwrap();
    {
        let store = LogStore::open(root.path(), "metrics.db").unwrap();
        store.upsert(&snapshot_at(base_time(), 1.0)).unwrap();
        store.upsert(&snapshot_at(base_time() + Duration::seconds(5), 2.0)).unwrap();
    }
    let store = LogStore::open(root.path(), "metrics.db").unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.list_all()[1].cpu_percent, 2.0);
}

#[test]
fn open_fails_when_directory_is_a_file() {
    let root = tempfile::tempdir().unwrap();
    let blocker = root.path().join("not_a_dir");
    std::fs::write(&blocker, b"x").unwrap();

    let err = LogStore::open(&blocker, "m.db").unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::IoFailure);
    assert!(matches!(err, StoreError::CreateDir { .. }));
}

#[test]
fn empty_store_lists_nothing() {
    let root = tempfile::tempdir().unwrap();
    let store = LogStore::open(root.path(), "m.db").unwrap();
    assert!(store.list_all().is_empty());
    assert!(store.is_empty());
}

#[test]
fn writes_after_close_are_write_failures() {
    let root = tempfile::tempdir().unwrap();
    let mut store = LogStore::open(root.path(), "m.db").unwrap();
    store.close();
    store.close();

    let err = store.upsert(&snapshot_at(base_time(), 1.0)).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::WriteFailure);
    assert!(matches!(store.clear_all(), Err(StoreError::Closed)));
    assert!(store.list_all().is_empty());
}

proptest! {
    #[test]
    fn list_is_sorted_for_any_insertion_order(
        offsets in prop::collection::vec(0i64..100_000, 0..40),
    ) {
        let store = LogStore::open_in_memory().unwrap();
        for (i, offset) in offsets.iter().enumerate() {
            let ts = base_time() + Duration::seconds(*offset);
            store.upsert(&snapshot_at(ts, i as f64)).unwrap();
        }

        let rows = store.list_all();
        let mut distinct = offsets.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(rows.len(), distinct.len());
        for pair in rows.windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn upsert_keeps_only_the_last_write_per_timestamp(
        values in prop::collection::vec(0.0f64..100.0, 1..20),
    ) {
        let store = LogStore::open_in_memory().unwrap();
        for value in &values {
            store.upsert(&snapshot_at(base_time(), *value)).unwrap();
        }

        let rows = store.list_all();
        prop_assert_eq!(rows.len(), 1);
        prop_assert_eq!(rows[0].cpu_percent, *values.last().unwrap());
    }

    #[test]
    fn clear_always_empties(count in 0usize..30) {
        let store = LogStore::open_in_memory().unwrap();
        for i in 0..count {
            let ts = base_time() + Duration::seconds(i as i64);
            store.upsert(&snapshot_at(ts, 1.0)).unwrap();
        }
        store.clear_all().unwrap();
        prop_assert!(store.list_all().is_empty());
    }
}
