use chrono::NaiveDateTime;

use super::snapshot::MetricSnapshot;

/// KB per GB, for rates derived from stored GB counters.
pub const GB_TO_KB: f64 = 1024.0 * 1024.0;

/// KB per byte, for rates derived from raw OS counters.
pub const BYTES_TO_KB: f64 = 1.0 / 1024.0;

/// Throughput between two counter readings. Non-positive elapsed time and
/// shrinking counters both report zero.
pub fn rate_kbs(current: f64, previous: f64, unit_factor: f64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    ((current - previous) * unit_factor / elapsed_secs).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub timestamp: NaiveDateTime,
    pub sent_kbs: f64,
    pub recv_kbs: f64,
}

/// Per-row throughput over an ascending log. The first row has no
/// predecessor and reports zero.
pub fn throughput_series(logs: &[MetricSnapshot]) -> Vec<RatePoint> {
    let mut out = Vec::with_capacity(logs.len());
    let mut prev: Option<&MetricSnapshot> = None;

    for row in logs {
        let (sent_kbs, recv_kbs) = match prev {
            Some(p) => {
                let elapsed = (row.timestamp - p.timestamp).num_milliseconds() as f64 / 1000.0;
                (
                    rate_kbs(row.bytes_sent_gb, p.bytes_sent_gb, GB_TO_KB, elapsed),
                    rate_kbs(row.bytes_recv_gb, p.bytes_recv_gb, GB_TO_KB, elapsed),
                )
            }
            None => (0.0, 0.0),
        };
        out.push(RatePoint {
            timestamp: row.timestamp,
            sent_kbs,
            recv_kbs,
        });
        prev = Some(row);
    }

    out
}
