use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::action::{Action, Direction};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::export::export_to_path;
use crate::store::{LogStore, StoreError};
use crate::system::process::ProcessInfo;
use crate::system::sampler::Sampler;
use crate::system::snapshot::{Capture, HostInfo, MetricSnapshot, NetworkInterface};

const STATUS_TTL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    ConfirmClear,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Processes,
    Logs,
    Graphs,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Processes, Tab::Logs, Tab::Graphs];

    pub fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::Processes => 1,
            Tab::Logs => 2,
            Tab::Graphs => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Processes => "Processes",
            Tab::Logs => "Logs",
            Tab::Graphs => "Graphs",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub refresh: KeyCode,
    pub export: KeyCode,
    pub clear: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            export: parse_key(&kb.export).unwrap_or(KeyCode::Char('e')),
            clear: parse_key(&kb.clear).unwrap_or(KeyCode::Char('x')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.refresh), "Sample and log now"),
            (key_label(self.export), "Export logs to CSV"),
            (key_label(self.clear), "Clear all logs"),
            (key_label(self.help), "Toggle help"),
            ("Tab".to_string(), "Next tab"),
            ("\u{2190}\u{2192}".to_string(), "Switch tab"),
            ("\u{2191}\u{2193}".to_string(), "Scroll"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

/// Result of one sample-and-log cycle.
pub struct Tick {
    pub capture: Capture,
    pub write_error: Option<StoreError>,
}

/// Sample once and hand the snapshot to the store. A failed write is
/// logged and reported, never propagated; the tick is simply not recorded.
pub fn record_tick(sampler: &mut Sampler, store: &LogStore) -> Tick {
    record_tick_at(sampler, store, Local::now())
}

pub fn record_tick_at(sampler: &mut Sampler, store: &LogStore, now: DateTime<Local>) -> Tick {
    let capture = sampler.capture_at(now);
    let write_error = match store.upsert(&capture.snapshot) {
        Ok(()) => {
            debug!(
                timestamp = %capture.snapshot.timestamp_text(),
                cpu = capture.snapshot.cpu_percent,
                ram = capture.snapshot.ram_percent,
                "snapshot recorded"
            );
            None
        }
        Err(err) => {
            warn!(%err, "snapshot not recorded");
            Some(err)
        }
    };
    Tick {
        capture,
        write_error,
    }
}

pub struct App {
    pub running: bool,
    pub sampler: Sampler,
    pub store: LogStore,
    pub host: HostInfo,
    pub latest: Capture,
    pub processes: Vec<ProcessInfo>,
    pub interfaces: Vec<NetworkInterface>,
    pub logs: Vec<MetricSnapshot>,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub status_message: Option<(String, Instant)>,
    /// Rows scrolled up from the newest log entry; 0 follows new rows.
    pub log_scroll: usize,
    pub process_scroll: usize,
    pub keybinds: ResolvedKeybinds,
    export_path: PathBuf,
    process_limit: usize,
}

impl App {
    /// Takes the first sample immediately so every view has data to draw.
    pub fn new(config: &Config, mut sampler: Sampler, store: LogStore) -> Self {
        let host = sampler.host().clone();
        let process_limit = config.general.process_limit;
        let Tick {
            capture,
            write_error,
        } = record_tick(&mut sampler, &store);
        let processes = sampler.processes(process_limit);
        let interfaces = sampler.interfaces();
        let logs = store.list_all();

        let mut app = App {
            running: true,
            sampler,
            store,
            host,
            latest: capture,
            processes,
            interfaces,
            logs,
            tab: Tab::default(),
            input_mode: InputMode::Normal,
            status_message: None,
            log_scroll: 0,
            process_scroll: 0,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            export_path: config.storage.resolved_export_path(),
            process_limit,
        };
        if let Some(err) = write_error {
            app.set_status(format!("Log write failed: {err}"));
        }
        app
    }

    /// Sample, log, then reload everything the views draw from.
    pub fn tick(&mut self) {
        let Tick {
            capture,
            write_error,
        } = record_tick(&mut self.sampler, &self.store);
        self.latest = capture;
        self.processes = self.sampler.processes(self.process_limit);
        self.interfaces = self.sampler.interfaces();
        self.reload_logs();

        if let Some(err) = write_error {
            self.set_status(format!("Log write failed: {err}"));
        } else {
            self.expire_status();
        }
    }

    fn reload_logs(&mut self) {
        self.logs = self.store.list_all();
        self.log_scroll = self.log_scroll.min(self.logs.len().saturating_sub(1));
        self.process_scroll = self
            .process_scroll
            .min(self.processes.len().saturating_sub(1));
    }

    fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    fn expire_status(&mut self) {
        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= STATUS_TTL_SECS
        {
            self.status_message = None;
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::ConfirmClear => map_key_confirm(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        match code {
            KeyCode::Tab | KeyCode::Right => return Action::NextTab,
            KeyCode::BackTab | KeyCode::Left => return Action::PrevTab,
            KeyCode::Up => return Action::Scroll(Direction::Up),
            KeyCode::Down => return Action::Scroll(Direction::Down),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.export {
            return Action::Export;
        }
        if code == kb.clear {
            return Action::RequestClear;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        if key.code == self.keybinds.help || key.code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NextTab => self.tab = self.tab.next(),
            Action::PrevTab => self.tab = self.tab.prev(),
            Action::Scroll(dir) => self.scroll(dir),
            Action::Refresh => self.tick(),
            Action::Export => self.export(),
            Action::RequestClear => self.input_mode = InputMode::ConfirmClear,
            Action::ConfirmClear => {
                self.input_mode = InputMode::Normal;
                self.clear_logs();
            }
            Action::CancelClear => self.input_mode = InputMode::Normal,
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::None => {}
        }
    }

    fn scroll(&mut self, direction: Direction) {
        match (self.tab, direction) {
            (Tab::Logs, Direction::Up) => {
                if self.log_scroll + 1 < self.logs.len() {
                    self.log_scroll += 1;
                }
            }
            (Tab::Logs, Direction::Down) => {
                self.log_scroll = self.log_scroll.saturating_sub(1);
            }
            (Tab::Processes, Direction::Up) => {
                self.process_scroll = self.process_scroll.saturating_sub(1);
            }
            (Tab::Processes, Direction::Down) => {
                if self.process_scroll + 1 < self.processes.len() {
                    self.process_scroll += 1;
                }
            }
            _ => {}
        }
    }

    fn export(&mut self) {
        match export_to_path(&self.export_path, &self.logs) {
            Ok(rows) => {
                info!(rows, path = %self.export_path.display(), "logs exported");
                self.set_status(format!(
                    "Exported {rows} rows to {}",
                    self.export_path.display()
                ));
            }
            Err(err) => {
                warn!(%err, path = %self.export_path.display(), "export failed");
                self.set_status(format!("Export failed: {err}"));
            }
        }
    }

    fn clear_logs(&mut self) {
        match self.store.clear_all() {
            Ok(()) => self.set_status("Cleared all logs".to_string()),
            Err(err) => {
                warn!(%err, "clearing logs failed");
                self.set_status(format!("Clear failed: {err}"));
            }
        }
        self.log_scroll = 0;
        self.reload_logs();
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    /// Close the store ahead of drop so the release is logged while the
    /// subscriber is still installed.
    pub fn shutdown(&mut self) {
        self.store.close();
    }
}

fn map_key_confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Action::ConfirmClear,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::CancelClear,
        _ => Action::None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::system::collector::MetricsProvider;
    use chrono::TimeZone;
    use std::net::{Ipv4Addr, Ipv6Addr};

    use crate::system::snapshot::{Ipv4Network, RawReadings};

    const GB: u64 = 1024 * 1024 * 1024;

    pub(crate) struct StaticProvider;

    impl MetricsProvider for StaticProvider {
        fn read(&mut self) -> RawReadings {
            RawReadings {
                cpu_percent: 10.5,
                per_cpu_percent: vec![8.0, 13.0],
                cpu_frequency_mhz: 0,
                memory_total: 16 * GB,
                memory_used: 4 * GB,
                memory_available: 12 * GB,
                swap_total: 2 * GB,
                swap_used: GB,
                bytes_sent: GB,
                bytes_recv: 2 * GB,
            }
        }

        fn host(&mut self) -> HostInfo {
            HostInfo {
                hostname: Some("workstation".into()),
                os_name: Some("Linux".into()),
                os_version: None,
                kernel_version: Some("6.1.0".into()),
                cpu_model: Some("Example CPU @ 3.00GHz".into()),
                logical_cores: 2,
                physical_cores: Some(1),
            }
        }

        fn processes(&mut self) -> Vec<ProcessInfo> {
            vec![
                ProcessInfo {
                    pid: 42,
                    name: "postgres".into(),
                    status: "Sleep".into(),
                    cpu_percent: 3.5,
                    memory_rss_mb: 128.0,
                    memory_vms_mb: 512.0,
                    user: Some("postgres".into()),
                    threads: Some(6),
                    started_at: None,
                },
                ProcessInfo {
                    pid: 7,
                    name: "firefox".into(),
                    status: "Run".into(),
                    cpu_percent: 22.0,
                    memory_rss_mb: 900.0,
                    memory_vms_mb: 4000.0,
                    user: Some("alice".into()),
                    threads: Some(112),
                    started_at: None,
                },
            ]
        }

        fn interfaces(&mut self) -> Vec<NetworkInterface> {
            vec![NetworkInterface {
                name: "eth0".into(),
                mac: Some("52:54:00:12:34:56".into()),
                ipv4: vec![Ipv4Network {
                    addr: Ipv4Addr::new(192, 168, 1, 20),
                    netmask: Ipv4Addr::new(255, 255, 255, 0),
                }],
                ipv6: vec![Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)],
            }]
        }
    }

    /// Static readings except for a CPU load that climbs by 10 each read.
    struct RisingCpu(f32);

    impl MetricsProvider for RisingCpu {
        fn read(&mut self) -> RawReadings {
            self.0 += 10.0;
            RawReadings {
                cpu_percent: self.0,
                ..StaticProvider.read()
            }
        }

        fn host(&mut self) -> HostInfo {
            StaticProvider.host()
        }
    }

    pub(crate) fn make_test_app() -> App {
        let store = LogStore::open_in_memory().unwrap();
        App::new(&Config::default(), Sampler::new(StaticProvider), store)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn startup_records_first_snapshot() {
        let app = make_test_app();
        assert_eq!(app.logs.len(), 1);
        assert_eq!(app.logs[0], app.latest.snapshot);
        assert_eq!(app.host.hostname.as_deref(), Some("workstation"));
        assert_eq!(app.processes[0].pid, 7);
    }

    #[test]
    fn tick_upserts_rather_than_duplicates_within_a_second() {
        let store = LogStore::open_in_memory().unwrap();
        let mut sampler = Sampler::new(RisingCpu(0.0));
        let second = Local.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).single().unwrap();

        let first = record_tick_at(&mut sampler, &store, second);
        let again = record_tick_at(
            &mut sampler,
            &store,
            second + chrono::Duration::milliseconds(600),
        );
        assert!(first.write_error.is_none());
        assert!(again.write_error.is_none());
        assert_eq!(first.capture.snapshot.cpu_percent, 10.0);
        assert_eq!(again.capture.snapshot.cpu_percent, 20.0);

        let rows = store.list_all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], again.capture.snapshot);
        assert_eq!(rows[0].timestamp_text(), "2025-06-30 12:00:00");
    }

    #[test]
    fn tick_refreshes_interfaces() {
        let mut app = make_test_app();
        app.interfaces.clear();
        app.tick();
        assert_eq!(app.interfaces.len(), 1);
        assert_eq!(app.interfaces[0].name, "eth0");
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut app = make_test_app();
        let action = app.map_key(press(KeyCode::Char('x')));
        assert_eq!(action, Action::RequestClear);
        app.dispatch(action);
        assert_eq!(app.input_mode, InputMode::ConfirmClear);
        assert_eq!(app.logs.len(), 1);

        let action = app.map_key(press(KeyCode::Char('n')));
        assert_eq!(action, Action::CancelClear);
        app.dispatch(action);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.logs.len(), 1);

        app.dispatch(Action::RequestClear);
        let action = app.map_key(press(KeyCode::Char('y')));
        app.dispatch(action);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.logs.is_empty());
        assert!(app.store.list_all().is_empty());
    }

    #[test]
    fn confirm_mode_ignores_other_keys() {
        let mut app = make_test_app();
        app.dispatch(Action::RequestClear);
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::None);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = make_test_app();
        app.dispatch(Action::RequestClear);
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(key), Action::Quit);
        app.dispatch(Action::Quit);
        assert!(!app.running);
    }

    #[test]
    fn tabs_wrap_both_ways() {
        let mut app = make_test_app();
        assert_eq!(app.tab, Tab::Overview);
        app.dispatch(Action::PrevTab);
        assert_eq!(app.tab, Tab::Graphs);
        app.dispatch(Action::NextTab);
        app.dispatch(Action::NextTab);
        assert_eq!(app.tab, Tab::Processes);
    }

    #[test]
    fn write_failure_keeps_running() {
        let mut app = make_test_app();
        app.store.close();
        app.tick();
        assert!(app.running);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.starts_with("Log write failed"));
        assert!(app.logs.is_empty());
    }

    #[test]
    fn export_writes_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_test_app();
        app.export_path = dir.path().join("logs.csv");
        app.dispatch(Action::Export);
        let text = std::fs::read_to_string(dir.path().join("logs.csv")).unwrap();
        assert_eq!(text.lines().count(), 2);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.starts_with("Exported 1 rows"));
    }

    #[test]
    fn log_scroll_is_bounded() {
        let mut app = make_test_app();
        app.tab = Tab::Logs;
        app.dispatch(Action::Scroll(Direction::Up));
        assert_eq!(app.log_scroll, 0);
        app.dispatch(Action::Scroll(Direction::Down));
        assert_eq!(app.log_scroll, 0);
    }

    #[test]
    fn help_toggles_with_escape() {
        let mut app = make_test_app();
        app.dispatch(app.map_key(press(KeyCode::Char('?'))));
        assert!(app.show_help());
        app.dispatch(app.map_key(press(KeyCode::Esc)));
        assert!(!app.show_help());
    }
}
