mod api;
mod app;
mod config;
mod events;
mod models;
mod render;
mod session;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use api::VersaClient;
use app::App;
use events::AppEvent;
use models::GenerateRequest;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config().unwrap_or_default();
    let client = VersaClient::new(config.base_url.clone(), config.request_timeout)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.default_role);

    // Channel for async events
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let res = run_app(&mut terminal, &mut app, &client, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Refresh the history list in the background. Fired when the history tab
/// becomes active; failures leave the current list in place.
fn fetch_history(client: &VersaClient, event_tx: &mpsc::UnboundedSender<AppEvent>) {
    let client = client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        match client.fetch_history().await {
            Ok(entries) => {
                let _ = tx.send(AppEvent::HistoryLoaded(entries));
            }
            Err(e) => {
                let _ = tx.send(AppEvent::HistoryFailed(e.to_string()));
            }
        }
    });
}

fn submit_generation(
    app: &mut App,
    client: &VersaClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let Some(task) = app.active_task() else {
        return;
    };

    let request = GenerateRequest::new(task, app.input_buffer.clone(), Some(app.role.clone()));
    // Empty input is rejected locally; nothing to show for it.
    if app
        .session
        .submit(client, request, event_tx)
        .is_ok()
    {
        app.generation_error = None;
        app.scroll_offset = 0;
    }
}

fn handle_keyboard_input(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    client: &VersaClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key {
        KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
        }
        KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_help();
        }
        KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_focus();
        }
        KeyCode::Tab => {
            if app.next_tab() {
                fetch_history(client, event_tx);
            }
        }
        KeyCode::BackTab => {
            if app.previous_tab() {
                fetch_history(client, event_tx);
            }
        }

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),

        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter if modifiers.contains(KeyModifiers::ALT) => {
            app.push_char('\n');
        }
        // Submitting while a generation is running supersedes it.
        KeyCode::Enter => {
            submit_generation(app, client, event_tx);
        }

        KeyCode::Char(c) => {
            app.push_char(c);
        }

        _ => {}
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &VersaClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Async events (stream deltas, history) first
        if let Ok(app_event) = event_rx.try_recv() {
            app.handle_event(app_event);
        }

        // ~60fps poll keeps streaming updates smooth
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.show_help {
                        if key.code == KeyCode::Esc
                            || (key.code == KeyCode::Char('h')
                                && key.modifiers.contains(KeyModifiers::CONTROL))
                        {
                            app.show_help = false;
                        }
                        continue;
                    }

                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            if app.exit_pending {
                                app.quit();
                            } else {
                                app.exit_pending = true;
                            }
                            continue;
                        }
                        KeyCode::Esc if app.exit_pending => {
                            app.exit_pending = false;
                            continue;
                        }
                        _ if app.exit_pending => {
                            // Any other key cancels pending exit
                            app.exit_pending = false;
                        }
                        _ => {}
                    }

                    handle_keyboard_input(app, key.code, key.modifiers, client, event_tx);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
