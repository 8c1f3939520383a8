use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table};

use crate::store::COLUMNS;
use crate::system::snapshot::MetricSnapshot;
use crate::ui::theme::Theme;

/// Rows that fit in `area` once borders and the header row are taken.
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

/// Window of `logs` ending `scroll` rows above the newest entry.
pub fn window(logs: &[MetricSnapshot], scroll: usize, capacity: usize) -> &[MetricSnapshot] {
    let end = logs.len().saturating_sub(scroll);
    let start = end.saturating_sub(capacity);
    &logs[start..end]
}

pub fn render(frame: &mut Frame, area: Rect, logs: &[MetricSnapshot], scroll: usize, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Logged snapshots ({}) ", logs.len()),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    if logs.is_empty() {
        frame.render_widget(
            Paragraph::new("No snapshots logged yet.")
                .style(Style::default().fg(theme.text_secondary))
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(COLUMNS).style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = window(logs, scroll, visible_rows(area))
        .iter()
        .map(|s| {
            Row::new([
                s.timestamp_text(),
                format!("{:.1}", s.cpu_percent),
                format!("{:.1}", s.ram_percent),
                format!("{:.2}", s.ram_used_gb),
                format!("{:.2}", s.bytes_sent_gb),
                format!("{:.2}", s.bytes_recv_gb),
            ])
            .style(Style::default().fg(theme.text_primary))
        })
        .collect();

    let widths = [
        Constraint::Length(21),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(15),
        Constraint::Length(15),
    ];

    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::snapshot::parse_timestamp;

    fn logs(n: usize) -> Vec<MetricSnapshot> {
        (0..n)
            .map(|i| MetricSnapshot {
                timestamp: parse_timestamp(&format!("2025-06-30 12:00:{i:02}")).unwrap(),
                cpu_percent: i as f64,
                ram_percent: 0.0,
                ram_used_gb: 0.0,
                bytes_sent_gb: 0.0,
                bytes_recv_gb: 0.0,
            })
            .collect()
    }

    #[test]
    fn window_follows_newest() {
        let rows = logs(10);
        let w = window(&rows, 0, 3);
        let cpus: Vec<f64> = w.iter().map(|s| s.cpu_percent).collect();
        assert_eq!(cpus, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn window_scrolls_back() {
        let rows = logs(10);
        let w = window(&rows, 2, 3);
        let cpus: Vec<f64> = w.iter().map(|s| s.cpu_percent).collect();
        assert_eq!(cpus, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn window_never_overruns() {
        let rows = logs(2);
        assert_eq!(window(&rows, 0, 10).len(), 2);
        assert!(window(&rows, 5, 10).is_empty());
        assert!(window(&[], 0, 10).is_empty());
    }
}
