use chrono::NaiveDateTime;

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub status: String,
    pub cpu_percent: f32,
    pub memory_rss_mb: f64,
    pub memory_vms_mb: f64,
    /// Owner's login name, or the numeric id when it does not resolve.
    pub user: Option<String>,
    /// `None` where the platform does not list a process's threads.
    pub threads: Option<usize>,
    pub started_at: Option<NaiveDateTime>,
}

/// Sort busiest first and keep at most `limit` entries (0 keeps all).
/// Ties fall back to pid so the order is stable between refreshes.
pub fn top_by_cpu(mut processes: Vec<ProcessInfo>, limit: usize) -> Vec<ProcessInfo> {
    processes.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| a.pid.cmp(&b.pid))
    });
    if limit > 0 {
        processes.truncate(limit);
    }
    processes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(pid: u32, cpu: f32) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: format!("proc_{pid}"),
            status: "Run".into(),
            cpu_percent: cpu,
            memory_rss_mb: 1.0,
            memory_vms_mb: 2.0,
            user: None,
            threads: None,
            started_at: None,
        }
    }

    #[test]
    fn sorts_by_cpu_descending() {
        let sorted = top_by_cpu(vec![process(1, 1.0), process(2, 9.0), process(3, 4.0)], 0);
        let pids: Vec<u32> = sorted.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![2, 3, 1]);
    }

    #[test]
    fn ties_order_by_pid() {
        let sorted = top_by_cpu(vec![process(7, 0.0), process(3, 0.0), process(5, 0.0)], 0);
        let pids: Vec<u32> = sorted.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![3, 5, 7]);
    }

    #[test]
    fn limit_truncates() {
        let procs = (0..10).map(|i| process(i, i as f32)).collect();
        let sorted = top_by_cpu(procs, 3);
        assert_eq!(sorted.len(), 3);
        assert_eq!(sorted[0].pid, 9);
    }
}
