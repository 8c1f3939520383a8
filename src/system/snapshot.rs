use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Text form of a snapshot timestamp, also its key in the log store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// One reading of system state, truncated to the second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub ram_used_gb: f64,
    pub bytes_sent_gb: f64,
    pub bytes_recv_gb: f64,
}

impl MetricSnapshot {
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Live network throughput in KB/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetRates {
    pub sent_kbs: f64,
    pub recv_kbs: f64,
}

/// Readings shown live but never persisted. `None` means the OS did not
/// expose the value, which is different from a reading of zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveDetails {
    pub per_cpu_percent: Vec<f32>,
    pub cpu_frequency_mhz: Option<u64>,
    /// Same value as the stored `ram_percent`, but `None` when the OS
    /// reported no memory total.
    pub ram_percent: Option<f64>,
    pub ram_total_gb: f64,
    pub ram_available_gb: f64,
    pub swap_used_gb: f64,
    pub swap_total_gb: f64,
    pub swap_percent: Option<f64>,
}

/// Everything one sampler call produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub snapshot: MetricSnapshot,
    pub rates: NetRates,
    pub details: LiveDetails,
}

/// Static description of the machine; read once per sampler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostInfo {
    pub hostname: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub cpu_model: Option<String>,
    pub logical_cores: usize,
    pub physical_cores: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Network {
    pub addr: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

/// Addresses bound to one network interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    /// `None` for interfaces without a hardware address, such as loopback.
    pub mac: Option<String>,
    pub ipv4: Vec<Ipv4Network>,
    pub ipv6: Vec<Ipv6Addr>,
}

/// Dotted netmask for an IPv4 prefix length; lengths past 32 saturate.
pub fn prefix_to_netmask(prefix: u8) -> Ipv4Addr {
    let bits = u32::from(prefix.min(32));
    Ipv4Addr::from(u32::MAX.checked_shl(32 - bits).unwrap_or(0))
}

/// Unshaped values as reported by a metrics provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReadings {
    pub cpu_percent: f32,
    pub per_cpu_percent: Vec<f32>,
    /// 0 when the OS does not report a frequency.
    pub cpu_frequency_mhz: u64,
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
    /// Cumulative across all interfaces.
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GB, 2)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
