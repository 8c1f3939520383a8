pub mod graphs;
pub mod header;
pub mod help;
pub mod logs;
pub mod overview;
pub mod processes;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, Tab};
use crate::ui::theme::Theme;

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = Theme::default();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(
        frame,
        chunks[0],
        &app.host,
        app.tab,
        app.logs.len(),
        &theme,
    );

    let content = chunks[1];
    match app.tab {
        Tab::Overview => overview::render(
            frame,
            content,
            &app.host,
            &app.latest,
            &app.interfaces,
            &theme,
        ),
        Tab::Processes => {
            processes::render(frame, content, &app.processes, app.process_scroll, &theme)
        }
        Tab::Logs => logs::render(frame, content, &app.logs, app.log_scroll, &theme),
        Tab::Graphs => graphs::render(frame, content, &app.logs, &theme),
    }

    statusbar::render(
        frame,
        chunks[2],
        app.input_mode,
        &app.keybinds,
        app.status_message.as_ref(),
        &theme,
    );

    // Drawn last so it sits on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &theme);
    }
}
