pub mod widgets;

use crate::app::{App, Tab};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Main area
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Bottom keymap bar
        ])
        .split(frame.area());

    widgets::render_tab_bar(frame, app, chunks[0]);

    if app.tab == Tab::History {
        widgets::render_history(frame, app, chunks[1]);
    } else {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        widgets::render_editor(frame, app, panes[0]);
        widgets::render_result(frame, app, panes[1]);
    }

    widgets::render_status_bar(frame, app, chunks[2]);
    widgets::render_bottom_bar(frame, chunks[3]);

    if app.show_help {
        widgets::render_help_window(frame, frame.area());
    }
}
