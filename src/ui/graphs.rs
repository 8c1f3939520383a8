use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline};

use crate::format::format_rate;
use crate::system::rate::throughput_series;
use crate::system::snapshot::MetricSnapshot;
use crate::ui::theme::Theme;

/// Percentages are drawn in hundredths so a sparkline keeps one decimal.
const PERCENT_SCALE: f64 = 100.0;

fn tail<T: Copy>(values: &[T], width: usize) -> &[T] {
    &values[values.len().saturating_sub(width)..]
}

pub fn render(frame: &mut Frame, area: Rect, logs: &[MetricSnapshot], theme: &Theme) {
    if logs.is_empty() {
        let block = panel(" History ".to_string(), theme);
        frame.render_widget(
            Paragraph::new("No history yet; graphs fill in as snapshots are logged.")
                .style(Style::default().fg(theme.text_secondary))
                .block(block),
            area,
        );
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(rows[1]);

    let cpu: Vec<u64> = logs
        .iter()
        .map(|s| (s.cpu_percent * PERCENT_SCALE) as u64)
        .collect();
    let ram: Vec<u64> = logs
        .iter()
        .map(|s| (s.ram_percent * PERCENT_SCALE) as u64)
        .collect();
    let series = throughput_series(logs);
    let sent: Vec<u64> = series.iter().map(|p| p.sent_kbs as u64).collect();
    let recv: Vec<u64> = series.iter().map(|p| p.recv_kbs as u64).collect();

    let latest = &logs[logs.len() - 1];
    let (last_sent, last_recv) = series
        .last()
        .map(|p| (p.sent_kbs, p.recv_kbs))
        .unwrap_or((0.0, 0.0));

    percent_sparkline(
        frame,
        top[0],
        format!(" CPU {:.1}% ", latest.cpu_percent),
        &cpu,
        theme.sparkline_cpu,
        theme,
    );
    percent_sparkline(
        frame,
        top[1],
        format!(" RAM {:.1}% ", latest.ram_percent),
        &ram,
        theme.sparkline_ram,
        theme,
    );
    rate_sparkline(
        frame,
        bottom[0],
        format!(" Upload {} ", format_rate(last_sent)),
        &sent,
        theme.sparkline_sent,
        theme,
    );
    rate_sparkline(
        frame,
        bottom[1],
        format!(" Download {} ", format_rate(last_recv)),
        &recv,
        theme.sparkline_recv,
        theme,
    );
}

fn panel(title: String, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

fn percent_sparkline(
    frame: &mut Frame,
    area: Rect,
    title: String,
    data: &[u64],
    color: Color,
    theme: &Theme,
) {
    let block = panel(title, theme);
    let width = block.inner(area).width as usize;
    let sparkline = Sparkline::default()
        .block(block)
        .data(tail(data, width))
        .max((100.0 * PERCENT_SCALE) as u64)
        .style(Style::default().fg(color));
    frame.render_widget(sparkline, area);
}

/// Rate panels scale to their own peak.
fn rate_sparkline(
    frame: &mut Frame,
    area: Rect,
    title: String,
    data: &[u64],
    color: Color,
    theme: &Theme,
) {
    let block = panel(title, theme);
    let width = block.inner(area).width as usize;
    let sparkline = Sparkline::default()
        .block(block)
        .data(tail(data, width))
        .style(Style::default().fg(color));
    frame.render_widget(sparkline, area);
}
