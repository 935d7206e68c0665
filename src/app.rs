use crate::events::AppEvent;
use crate::models::{HistoryEntry, TaskKind};
use crate::session::{SessionController, SessionEvent};

/// One sidebar tab: a writing task or the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Task(TaskKind),
    History,
}

impl Tab {
    pub const ALL: [Self; 5] = [
        Self::Task(TaskKind::WeeklyReport),
        Self::Task(TaskKind::XhsStyle),
        Self::Task(TaskKind::EmailPolish),
        Self::Task(TaskKind::MeetingMinutes),
        Self::History,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Task(kind) => kind.label(),
            Self::History => "创作历史",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Which text field typed characters go to. Role editing only exists on the
/// weekly report tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFocus {
    Content,
    Role,
}

#[derive(Debug)]
pub struct App {
    pub tab: Tab,
    pub should_quit: bool,
    pub input_buffer: String,
    pub role: String,
    pub focus: InputFocus,
    pub session: SessionController,
    pub history: Vec<HistoryEntry>,
    pub history_error: Option<String>,
    /// Underlying reason for the last generation failure; status line only,
    /// the result pane shows the fixed failure message.
    pub generation_error: Option<String>,
    pub scroll_offset: usize,
    pub show_help: bool,
    pub exit_pending: bool,
}

impl App {
    pub fn new(default_role: String) -> Self {
        Self {
            tab: Tab::Task(TaskKind::WeeklyReport),
            should_quit: false,
            input_buffer: String::new(),
            role: default_role,
            focus: InputFocus::Content,
            session: SessionController::new(),
            history: Vec::new(),
            history_error: None,
            generation_error: None,
            scroll_offset: 0,
            show_help: false,
            exit_pending: false,
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// The task behind the active tab, if it is not the history view.
    pub const fn active_task(&self) -> Option<TaskKind> {
        match self.tab {
            Tab::Task(kind) => Some(kind),
            Tab::History => None,
        }
    }

    /// Switch tabs. Returns true when the history view just became active,
    /// which is the caller's cue to refresh the list.
    pub fn switch_tab(&mut self, tab: Tab) -> bool {
        let activated_history = tab == Tab::History && self.tab != Tab::History;
        if tab != self.tab {
            self.tab = tab;
            self.focus = InputFocus::Content;
            self.scroll_offset = 0;
        }
        activated_history
    }

    pub fn next_tab(&mut self) -> bool {
        self.switch_tab(self.tab.next())
    }

    pub fn previous_tab(&mut self) -> bool {
        self.switch_tab(self.tab.previous())
    }

    pub fn toggle_focus(&mut self) {
        // Only the weekly report carries a role.
        if self.tab != Tab::Task(TaskKind::WeeklyReport) {
            self.focus = InputFocus::Content;
            return;
        }
        self.focus = match self.focus {
            InputFocus::Content => InputFocus::Role,
            InputFocus::Role => InputFocus::Content,
        };
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            InputFocus::Content => self.input_buffer.push(c),
            InputFocus::Role => self.role.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            InputFocus::Content => {
                self.input_buffer.pop();
            }
            InputFocus::Role => {
                self.role.pop();
            }
        }
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Clamped to the real maximum by the rendering code.
        self.scroll_offset = usize::MAX;
    }

    /// Fold one async event into the UI state.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::GenerationDelta { epoch, content } => {
                if self.session.handle_event(epoch, SessionEvent::Delta(content)) {
                    self.scroll_to_bottom();
                }
            }
            AppEvent::GenerationDone { epoch } => {
                self.session.handle_event(epoch, SessionEvent::Done);
            }
            AppEvent::GenerationFailed { epoch, error } => {
                if self.session.handle_event(epoch, SessionEvent::Failed) {
                    self.generation_error = Some(error);
                    self.scroll_offset = 0;
                }
            }
            AppEvent::HistoryLoaded(entries) => {
                self.history = entries;
                self.history_error = None;
            }
            AppEvent::HistoryFailed(error) => {
                // Keep whatever was loaded before; only the status line
                // mentions the failure.
                self.history_error = Some(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn entry(id: i64) -> HistoryEntry {
        HistoryEntry {
            id,
            task_type: TaskKind::WeeklyReport,
            generated_result: Value::String("done".to_string()),
            created_at: NaiveDate::from_ymd_opt(2026, 2, 10)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_app_new() {
        let app = App::new("高级产品经理".to_string());
        assert_eq!(app.tab, Tab::Task(TaskKind::WeeklyReport));
        assert!(!app.should_quit);
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_tab_cycle_covers_all_and_wraps() {
        let mut tab = Tab::Task(TaskKind::WeeklyReport);
        for expected in &Tab::ALL[1..] {
            tab = tab.next();
            assert_eq!(tab, *expected);
        }
        assert_eq!(tab.next(), Tab::Task(TaskKind::WeeklyReport));
        assert_eq!(Tab::Task(TaskKind::WeeklyReport).previous(), Tab::History);
    }

    #[test]
    fn test_history_activation_trigger_fires_once() {
        let mut app = App::new(String::new());
        assert!(!app.next_tab()); // xhs
        assert!(!app.next_tab()); // email
        assert!(!app.next_tab()); // meeting
        assert!(app.next_tab()); // history: trigger
        assert!(!app.switch_tab(Tab::History)); // already active: no trigger
        assert!(!app.next_tab()); // back to weekly
    }

    #[test]
    fn test_history_loaded_replaces_list() {
        let mut app = App::new(String::new());
        app.handle_event(AppEvent::HistoryLoaded(vec![entry(1), entry(2)]));
        assert_eq!(app.history.len(), 2);

        app.handle_event(AppEvent::HistoryLoaded(vec![entry(3)]));
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].id, 3);
    }

    #[test]
    fn test_history_failure_keeps_previous_list() {
        let mut app = App::new(String::new());
        app.handle_event(AppEvent::HistoryLoaded(vec![entry(1)]));
        app.handle_event(AppEvent::HistoryFailed("connection refused".to_string()));
        assert_eq!(app.history.len(), 1);
        assert!(app.history_error.is_some());
    }

    #[test]
    fn test_focus_toggle_only_on_weekly_tab() {
        let mut app = App::new(String::new());
        app.toggle_focus();
        assert_eq!(app.focus, InputFocus::Role);
        app.toggle_focus();
        assert_eq!(app.focus, InputFocus::Content);

        app.switch_tab(Tab::Task(TaskKind::EmailPolish));
        app.toggle_focus();
        assert_eq!(app.focus, InputFocus::Content);
    }

    #[test]
    fn test_typing_targets_focused_field() {
        let mut app = App::new("角色".to_string());
        app.push_char('a');
        app.toggle_focus();
        app.push_char('员');
        assert_eq!(app.input_buffer, "a");
        assert_eq!(app.role, "角色员");
        app.backspace();
        assert_eq!(app.role, "角色");
    }

    #[test]
    fn test_switch_tab_resets_scroll_and_focus() {
        let mut app = App::new(String::new());
        app.toggle_focus();
        app.scroll_offset = 12;
        app.switch_tab(Tab::Task(TaskKind::MeetingMinutes));
        assert_eq!(app.focus, InputFocus::Content);
        assert_eq!(app.scroll_offset, 0);
    }

    #[test]
    fn test_scrolling_saturates() {
        let mut app = App::new(String::new());
        app.scroll_up(5);
        assert_eq!(app.scroll_offset, 0);
        app.scroll_down(3);
        app.scroll_up(1);
        assert_eq!(app.scroll_offset, 2);
    }
}
