use std::net::IpAddr;

use chrono::{DateTime, Local};
use sysinfo::{
    MINIMUM_CPU_UPDATE_INTERVAL, Networks, Process, ProcessRefreshKind, ProcessesToUpdate,
    System, ThreadKind, UpdateKind, Users,
};

use super::process::ProcessInfo;
use super::snapshot::{HostInfo, Ipv4Network, NetworkInterface, RawReadings, prefix_to_netmask};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of raw OS readings behind the sampler.
pub trait MetricsProvider {
    fn read(&mut self) -> RawReadings;

    fn host(&mut self) -> HostInfo;

    fn processes(&mut self) -> Vec<ProcessInfo> {
        Vec::new()
    }

    fn interfaces(&mut self) -> Vec<NetworkInterface> {
        Vec::new()
    }
}

pub struct SysinfoCollector {
    sys: System,
    networks: Networks,
    users: Users,
}

impl Default for SysinfoCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoCollector {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, process_refresh_kind());
        // CPU usage is a delta between two refreshes; without a second one
        // spaced by the minimum interval the first reading is noise.
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_all();

        let networks = Networks::new_with_refreshed_list();
        let users = Users::new_with_refreshed_list();
        SysinfoCollector {
            sys,
            networks,
            users,
        }
    }

    fn user_name(&self, process: &Process) -> Option<String> {
        let uid = process.user_id()?;
        Some(match self.users.get_user_by_id(uid) {
            Some(user) => user.name().to_string(),
            None => format!("{uid:?}"),
        })
    }

    fn network_totals(&self) -> (u64, u64) {
        self.networks
            .list()
            .values()
            .fold((0, 0), |(sent, recv), data| {
                (
                    sent + data.total_transmitted(),
                    recv + data.total_received(),
                )
            })
    }
}

impl MetricsProvider for SysinfoCollector {
    fn read(&mut self) -> RawReadings {
        self.sys.refresh_memory();
        self.sys.refresh_cpu_all();
        self.networks.refresh(true);

        let (bytes_sent, bytes_recv) = self.network_totals();
        let cpus = self.sys.cpus();

        RawReadings {
            cpu_percent: self.sys.global_cpu_usage(),
            per_cpu_percent: cpus.iter().map(|c| c.cpu_usage()).collect(),
            cpu_frequency_mhz: cpus.first().map(|c| c.frequency()).unwrap_or(0),
            memory_total: self.sys.total_memory(),
            memory_used: self.sys.used_memory(),
            memory_available: self.sys.available_memory(),
            swap_total: self.sys.total_swap(),
            swap_used: self.sys.used_swap(),
            bytes_sent,
            bytes_recv,
        }
    }

    fn host(&mut self) -> HostInfo {
        let cpu_model = self
            .sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|brand| !brand.is_empty());

        HostInfo {
            hostname: System::host_name(),
            os_name: System::name(),
            os_version: System::os_version(),
            kernel_version: System::kernel_version(),
            cpu_model,
            logical_cores: self.sys.cpus().len(),
            physical_cores: System::physical_core_count(),
        }
    }

    fn processes(&mut self) -> Vec<ProcessInfo> {
        self.sys
            .refresh_processes_specifics(ProcessesToUpdate::All, true, process_refresh_kind());

        self.sys
            .processes()
            .iter()
            // Userland threads show up as their own entries on Linux.
            .filter(|(_, process)| process.thread_kind() != Some(ThreadKind::Userland))
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().to_string(),
                status: format!("{:?}", process.status()),
                cpu_percent: process.cpu_usage(),
                memory_rss_mb: process.memory() as f64 / BYTES_PER_MB,
                memory_vms_mb: process.virtual_memory() as f64 / BYTES_PER_MB,
                user: self.user_name(process),
                // The task set excludes the main thread.
                threads: process.tasks().map(|tasks| tasks.len() + 1),
                started_at: started_at(process.start_time()),
            })
            .collect()
    }

    fn interfaces(&mut self) -> Vec<NetworkInterface> {
        let mut out: Vec<NetworkInterface> = self
            .networks
            .list()
            .iter()
            .map(|(name, data)| {
                let mac = data.mac_address();
                let mut iface = NetworkInterface {
                    name: name.clone(),
                    mac: (!mac.is_unspecified()).then(|| mac.to_string()),
                    ..NetworkInterface::default()
                };
                for net in data.ip_networks() {
                    match net.addr {
                        IpAddr::V4(addr) => iface.ipv4.push(Ipv4Network {
                            addr,
                            netmask: prefix_to_netmask(net.prefix),
                        }),
                        IpAddr::V6(addr) => iface.ipv6.push(addr),
                    }
                }
                iface
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

fn process_refresh_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing()
        .with_memory()
        .with_cpu()
        .with_tasks()
        .with_user(UpdateKind::OnlyIfNotSet)
}

fn started_at(epoch_secs: u64) -> Option<chrono::NaiveDateTime> {
    if epoch_secs == 0 {
        return None;
    }
    let secs = i64::try_from(epoch_secs).ok()?;
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&Local).naive_local())
}
