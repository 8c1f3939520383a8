use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, ResolvedKeybinds, key_label};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    input_mode: InputMode,
    keybinds: &ResolvedKeybinds,
    status_message: Option<&(String, std::time::Instant)>,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // The clear prompt outranks any pending status message
    if input_mode == InputMode::ConfirmClear {
        let mut spans = vec![Span::styled(
            " Clear all logs? ",
            Style::default()
                .fg(theme.status_warn)
                .add_modifier(Modifier::BOLD),
        )];
        spans.extend(pill_spans("y".to_string(), "Yes", theme));
        spans.extend(pill_spans("n".to_string(), "No", theme));
        frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
        return;
    }

    if let Some((msg, _)) = status_message {
        let color = if msg.starts_with("Exported") || msg.starts_with("Cleared") {
            theme.status_ok
        } else {
            theme.status_err
        };
        let line = Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let mut spans = Vec::new();
    spans.extend(pill_spans(key_label(keybinds.quit), "Quit", theme));
    spans.extend(pill_spans("Tab".to_string(), "View", theme));
    spans.extend(pill_spans(key_label(keybinds.refresh), "Sample", theme));
    spans.extend(pill_spans(key_label(keybinds.export), "Export", theme));
    spans.extend(pill_spans(key_label(keybinds.clear), "Clear", theme));
    spans.extend(pill_spans(key_label(keybinds.help), "Help", theme));
    spans.extend(pill_spans("\u{2191}\u{2193}".to_string(), "Scroll", theme));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: String, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
