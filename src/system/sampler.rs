use chrono::{DateTime, Local, SubsecRound};
use tracing::warn;

use super::collector::MetricsProvider;
use super::process::{ProcessInfo, top_by_cpu};
use super::rate::{BYTES_TO_KB, rate_kbs};
use super::snapshot::{
    Capture, HostInfo, LiveDetails, MetricSnapshot, NetRates, NetworkInterface, RawReadings,
    bytes_to_gb, round_to,
};

#[derive(Debug, Clone, Copy)]
struct CounterMark {
    bytes_sent: u64,
    bytes_recv: u64,
    at: DateTime<Local>,
}

/// Turns raw provider readings into snapshots. Owns the previous network
/// counters so live rates need no shared state.
pub struct Sampler {
    provider: Box<dyn MetricsProvider>,
    host: Option<HostInfo>,
    previous: Option<CounterMark>,
}

impl Sampler {
    pub fn new(provider: impl MetricsProvider + 'static) -> Self {
        Sampler {
            provider: Box::new(provider),
            host: None,
            previous: None,
        }
    }

    pub fn capture(&mut self) -> Capture {
        self.capture_at(Local::now())
    }

    pub fn capture_at(&mut self, now: DateTime<Local>) -> Capture {
        let raw = self.provider.read();
        let rates = self.advance_counters(&raw, now);

        Capture {
            snapshot: shape_snapshot(&raw, now),
            rates,
            details: shape_details(&raw),
        }
    }

    /// Host details never change while running, so the provider is asked once.
    pub fn host(&mut self) -> &HostInfo {
        let provider = &mut self.provider;
        self.host.get_or_insert_with(|| provider.host())
    }

    pub fn processes(&mut self, limit: usize) -> Vec<ProcessInfo> {
        top_by_cpu(self.provider.processes(), limit)
    }

    pub fn interfaces(&mut self) -> Vec<NetworkInterface> {
        self.provider.interfaces()
    }

    fn advance_counters(&mut self, raw: &RawReadings, now: DateTime<Local>) -> NetRates {
        let rates = match self.previous {
            Some(prev) => {
                let elapsed = (now - prev.at).num_milliseconds() as f64 / 1000.0;
                NetRates {
                    sent_kbs: rate_kbs(
                        raw.bytes_sent as f64,
                        prev.bytes_sent as f64,
                        BYTES_TO_KB,
                        elapsed,
                    ),
                    recv_kbs: rate_kbs(
                        raw.bytes_recv as f64,
                        prev.bytes_recv as f64,
                        BYTES_TO_KB,
                        elapsed,
                    ),
                }
            }
            None => NetRates::default(),
        };

        self.previous = Some(CounterMark {
            bytes_sent: raw.bytes_sent,
            bytes_recv: raw.bytes_recv,
            at: now,
        });
        rates
    }
}

fn percent(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(round_to(part as f64 / total as f64 * 100.0, 1))
}

fn shape_snapshot(raw: &RawReadings, now: DateTime<Local>) -> MetricSnapshot {
    // Stored rows always carry a number; a missing total is logged as 0.
    let ram_percent = percent(raw.memory_used, raw.memory_total).unwrap_or_else(|| {
        warn!(
            used = raw.memory_used,
            "memory total reported as 0; storing ram_percent as 0"
        );
        0.0
    });

    MetricSnapshot {
        timestamp: now.naive_local().trunc_subsecs(0),
        cpu_percent: round_to(f64::from(raw.cpu_percent), 1),
        ram_percent,
        ram_used_gb: bytes_to_gb(raw.memory_used),
        bytes_sent_gb: bytes_to_gb(raw.bytes_sent),
        bytes_recv_gb: bytes_to_gb(raw.bytes_recv),
    }
}

fn shape_details(raw: &RawReadings) -> LiveDetails {
    LiveDetails {
        per_cpu_percent: raw.per_cpu_percent.clone(),
        cpu_frequency_mhz: (raw.cpu_frequency_mhz > 0).then_some(raw.cpu_frequency_mhz),
        ram_percent: percent(raw.memory_used, raw.memory_total),
        ram_total_gb: bytes_to_gb(raw.memory_total),
        ram_available_gb: bytes_to_gb(raw.memory_available),
        swap_used_gb: bytes_to_gb(raw.swap_used),
        swap_total_gb: bytes_to_gb(raw.swap_total),
        swap_percent: percent(raw.swap_used, raw.swap_total),
    }
}
