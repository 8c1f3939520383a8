use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Row, Table};

use crate::format::{NOT_AVAILABLE, truncate_unicode};
use crate::system::process::ProcessInfo;
use crate::system::snapshot::TIMESTAMP_FORMAT;
use crate::ui::theme::Theme;

const NAME_WIDTH: u16 = 16;
const USER_WIDTH: u16 = 10;

pub fn render(frame: &mut Frame, area: Rect, processes: &[ProcessInfo], scroll: usize, theme: &Theme) {
    let header = Row::new([
        "PID", "Name", "User", "Status", "Threads", "CPU %", "RSS MB", "VMS MB", "Started",
    ])
        .style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );

    let rows: Vec<Row> = processes
        .iter()
        .skip(scroll)
        .map(|p| {
            Row::new([
                p.pid.to_string(),
                truncate_unicode(&p.name, NAME_WIDTH as usize),
                p.user
                    .as_deref()
                    .map(|user| truncate_unicode(user, USER_WIDTH as usize))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                p.status.clone(),
                p.threads
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                format!("{:.1}", p.cpu_percent),
                format!("{:.1}", p.memory_rss_mb),
                format!("{:.1}", p.memory_vms_mb),
                p.started_at
                    .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ])
            .style(Style::default().fg(theme.text_primary))
        })
        .collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Length(NAME_WIDTH),
        Constraint::Length(USER_WIDTH),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Min(19),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Processes by CPU ({}) ", processes.len()),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
