use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::format::{NOT_AVAILABLE, format_gb, format_optional, format_rate, format_text};
use crate::system::snapshot::{Capture, HostInfo, NetworkInterface};
use crate::ui::theme::{Theme, load_color};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    host: &HostInfo,
    capture: &Capture,
    interfaces: &[NetworkInterface],
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    render_host(frame, chunks[0], host, capture, theme);

    let snapshot = &capture.snapshot;
    render_gauge(
        frame,
        chunks[1],
        " CPU ",
        snapshot.cpu_percent,
        format!("{:.1}%", snapshot.cpu_percent),
        theme,
    );
    render_gauge(
        frame,
        chunks[2],
        " RAM ",
        capture.details.ram_percent.unwrap_or(0.0),
        format!(
            "{} / {} ({})",
            format_gb(snapshot.ram_used_gb),
            format_gb(capture.details.ram_total_gb),
            format_optional(capture.details.ram_percent, |pct| format!("{pct:.1}%"))
        ),
        theme,
    );
    render_network(frame, chunks[3], capture, theme);
    render_interfaces(frame, chunks[4], interfaces, theme);
}

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{label:<10}"),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(theme.text_primary)),
    ])
}

fn render_host(frame: &mut Frame, area: Rect, host: &HostInfo, capture: &Capture, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " System ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let os = match (host.os_name.as_deref(), host.os_version.as_deref()) {
        (Some(name), Some(version)) => format!("{name} {version}"),
        (name, _) => format_text(name),
    };
    let swap = format_optional(capture.details.swap_percent, |pct| {
        format!(
            "{} / {} ({pct:.1}%)",
            format_gb(capture.details.swap_used_gb),
            format_gb(capture.details.swap_total_gb)
        )
    });

    let lines = vec![
        field("OS", os, theme),
        field("Kernel", format_text(host.kernel_version.as_deref()), theme),
        field(
            "CPU",
            format!(
                "{} ({} physical, {} logical, {})",
                format_text(host.cpu_model.as_deref()),
                format_optional(host.physical_cores, |n| n.to_string()),
                host.logical_cores,
                format_optional(capture.details.cpu_frequency_mhz, |mhz| format!("{mhz} MHz"))
            ),
            theme,
        ),
        field(
            "Memory",
            format!("{} available", format_gb(capture.details.ram_available_gb)),
            theme,
        ),
        field("Swap", swap, theme),
        field("Cores", per_core(&capture.details.per_cpu_percent), theme),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn per_core(usage: &[f32]) -> String {
    if usage.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    usage
        .iter()
        .map(|pct| format!("{pct:.0}%"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_gauge(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    percent: f64,
    label: String,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(
            Style::default()
                .fg(load_color(theme, percent))
                .bg(theme.gauge_unfilled),
        )
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_network(frame: &mut Frame, area: Rect, capture: &Capture, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Network (live) ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let snapshot = &capture.snapshot;
    let line = Line::from(vec![
        Span::styled("Upload ", Style::default().fg(theme.sparkline_sent)),
        Span::raw(format_rate(capture.rates.sent_kbs)),
        Span::raw("  "),
        Span::styled("Download ", Style::default().fg(theme.sparkline_recv)),
        Span::raw(format_rate(capture.rates.recv_kbs)),
        Span::styled(
            format!(
                "   Total sent {}  received {}",
                format_gb(snapshot.bytes_sent_gb),
                format_gb(snapshot.bytes_recv_gb)
            ),
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn interface_line<'a>(iface: &'a NetworkInterface, theme: &Theme) -> Line<'a> {
    let mut addrs: Vec<String> = iface
        .ipv4
        .iter()
        .map(|net| format!("{}/{}", net.addr, net.netmask))
        .collect();
    addrs.extend(iface.ipv6.iter().map(|addr| addr.to_string()));
    if addrs.is_empty() {
        addrs.push(NOT_AVAILABLE.to_string());
    }

    Line::from(vec![
        Span::styled(
            format!("{:<10}", iface.name),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<19}", format_text(iface.mac.as_deref())),
            Style::default().fg(theme.text_secondary),
        ),
        Span::styled(addrs.join("  "), Style::default().fg(theme.text_primary)),
    ])
}

fn render_interfaces(frame: &mut Frame, area: Rect, interfaces: &[NetworkInterface], theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Interfaces ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let lines: Vec<Line> = if interfaces.is_empty() {
        vec![Line::from(Span::styled(
            NOT_AVAILABLE,
            Style::default().fg(theme.text_secondary),
        ))]
    } else {
        interfaces.iter().map(|iface| interface_line(iface, theme)).collect()
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
