use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, InputFocus, Tab};
use crate::models::{HistoryEntry, TaskKind};
use crate::render::{interpret, RenderPlan, SectionBody};
use crate::session::SessionState;

pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.label())).collect();
    let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    frame.render_widget(tabs, area);
}

pub fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let mut title = " 输入 ".to_string();
    if app.tab == Tab::Task(TaskKind::WeeklyReport) {
        title.push_str(&format!("· 角色: {} ", app.role));
    }

    let (text, style) = if app.input_buffer.is_empty() {
        let placeholder = app
            .active_task()
            .map_or("", TaskKind::placeholder);
        (placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (app.input_buffer.clone(), Style::default())
    };

    let border_color = match app.focus {
        InputFocus::Content => Color::Cyan,
        InputFocus::Role => Color::Yellow,
    };

    let editor = Paragraph::new(text)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border_color)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(editor, area);
}

pub fn render_result(frame: &mut Frame, app: &mut App, area: Rect) {
    let snapshot = app.session.result();
    let lines = if snapshot.is_empty() {
        vec![Line::from(Span::styled(
            "Engine Idle",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        // Live snapshots are plain text; the interpreter keeps the branch
        // uniform with the history view.
        plan_to_lines(&interpret(&serde_json::Value::String(snapshot.to_string())))
    };

    let title = match app.session.state() {
        SessionState::Generating => " 生成结果 · 生成中… ",
        SessionState::Failed => " 生成结果 · 失败 ",
        SessionState::Idle => " 生成结果 ",
    };

    // Clamp the scroll so usize::MAX means "bottom".
    let visible = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    app.scroll_offset = app.scroll_offset.min(max_scroll);

    #[allow(clippy::cast_possible_truncation)]
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(match app.session.state() {
                    SessionState::Failed => Color::Red,
                    _ => Color::Green,
                })),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset as u16, 0));

    frame.render_widget(paragraph, area);
}

/// Flatten a render plan into display lines.
pub fn plan_to_lines(plan: &RenderPlan) -> Vec<Line<'static>> {
    match plan {
        RenderPlan::Text(text) => text.lines().map(|l| Line::from(l.to_string())).collect(),
        RenderPlan::Document(sections) => {
            let mut lines = Vec::new();
            for (name, body) in sections {
                lines.push(Line::from(Span::styled(
                    name.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )));
                match body {
                    SectionBody::Line(text) => lines.push(Line::from(text.clone())),
                    SectionBody::NumberedList(items) => {
                        for (i, item) in items.iter().enumerate() {
                            lines.push(Line::from(format!("{}. {item}", i + 1)));
                        }
                    }
                }
                lines.push(Line::from(""));
            }
            lines
        }
    }
}

pub fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    if app.history.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "暂无创作历史",
            Style::default().fg(Color::DarkGray),
        )))
        .block(Block::default().borders(Borders::ALL).title(" 创作历史 "));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app.history.iter().map(history_item).collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" 创作历史 ({}) ", app.history.len())),
    );

    frame.render_widget(list, area);
}

fn history_item(entry: &HistoryEntry) -> ListItem<'static> {
    let header = Line::from(vec![
        Span::styled(
            entry.task_type.label(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let mut lines = vec![header];
    let mut body = plan_to_lines(&interpret(&entry.generated_result));
    body.truncate(4);
    lines.extend(body);
    lines.push(Line::from(""));

    ListItem::new(lines)
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (state_text, state_color) = match app.session.state() {
        SessionState::Idle => ("空闲", Color::Green),
        SessionState::Generating => ("生成中…", Color::Yellow),
        SessionState::Failed => ("失败", Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {state_text} "),
            Style::default().fg(state_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::raw(app.tab.label()),
    ];

    if app.exit_pending {
        spans.push(Span::styled(
            "  再按一次 Ctrl+C 退出",
            Style::default().fg(Color::Red),
        ));
    } else if let (SessionState::Failed, Some(error)) =
        (app.session.state(), &app.generation_error)
    {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(error) = &app.history_error {
        spans.push(Span::styled(
            format!("  历史加载失败: {error}"),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_bottom_bar(frame: &mut Frame, area: Rect) {
    let bar = Paragraph::new(Line::from(Span::styled(
        " Tab 切换 │ Enter 生成 │ Alt+Enter 换行 │ Ctrl+R 角色 │ Ctrl+H 帮助 │ Ctrl+C 退出",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(bar, area);
}

pub fn render_help_window(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            "Versa - Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("General:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+C (x2)   - Quit application"),
        Line::from("  Ctrl+Q        - Quit application"),
        Line::from(""),
        Line::from(Span::styled("Tabs:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Tab           - Next tab"),
        Line::from("  Shift+Tab     - Previous tab"),
        Line::from(""),
        Line::from(Span::styled("Editor:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Enter         - Generate"),
        Line::from("  Alt+Enter     - Insert newline"),
        Line::from("  Ctrl+R        - Edit role (weekly report)"),
        Line::from(""),
        Line::from(Span::styled("Navigation:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Up/Down       - Scroll result"),
        Line::from("  PgUp/PgDn     - Scroll result"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    let popup_width = 50;
    let popup_height = 24;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}
