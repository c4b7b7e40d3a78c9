//! Async event handler for the playground TUI.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::execution::{Language, Playground};

use super::{app::App, events::TuiEvent, ui::render_ui};

/// Run the interactive playground
pub async fn run_playground(cfg: &Config, start: Language) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!(
            "the playground requires a proper terminal environment"
        ));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let playground = Playground::new(cfg);
    playground.select_language(start);
    let mut app = App::new(start);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // Main event loop
    let result = run_app(&mut terminal, &mut app, playground, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    playground: Playground,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    // Spawn input handler
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        loop {
            // Poll for keyboard events
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if input_tx.send(TuiEvent::Key(key)).is_err() {
                        break; // Channel closed
                    }
                }
            }
        }
    });

    loop {
        // Runtime hints for the status bar and the output placeholder
        app.runtime_status = playground.runtime_status();
        app.runtime_cached = playground.runtime_cached();

        // Render UI
        terminal.draw(|frame| render_ui(frame, app))?;

        // Handle events
        if let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, key, &playground, &event_tx) {
                        break; // Quit requested
                    }
                }
                TuiEvent::RunFinished(lines) => {
                    app.set_output(lines);
                    app.is_running = false;
                }
            }
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }

    Ok(())
}

/// Handle keyboard events. Returns true when the app should quit.
fn handle_key_event(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    playground: &Playground,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    // Any key closes the help overlay
    if app.show_help {
        app.toggle_help();
        return false;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return true; // Quit
        }
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_output();
        }
        KeyCode::F(1) => {
            app.toggle_help();
        }
        KeyCode::F(2) => {
            let next = match app.language {
                Language::JavaScript => Language::Python,
                Language::Python => Language::JavaScript,
            };
            app.set_language(next);
            playground.select_language(next);
        }
        KeyCode::F(5) => trigger_run(app, playground, event_tx),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::CONTROL) => {
            // Ctrl+Enter, where the terminal reports it
            trigger_run(app, playground, event_tx);
        }
        KeyCode::Enter => app.newline(),
        KeyCode::Tab => app.insert_str("  "),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.move_left(),
        KeyCode::Right => app.move_right(),
        KeyCode::Up => app.move_up(),
        KeyCode::Down => app.move_down(),
        KeyCode::Home => app.move_home(),
        KeyCode::End => app.move_end(),
        KeyCode::PageUp => app.scroll_output_up(5),
        KeyCode::PageDown => app.scroll_output_down(5),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }

    false
}

/// Kick off one run in the background; the transcript comes back as a
/// `RunFinished` event. No-op while a run is outstanding.
fn trigger_run(app: &mut App, playground: &Playground, event_tx: &mpsc::UnboundedSender<TuiEvent>) {
    if app.is_running || playground.is_busy() {
        return;
    }
    app.is_running = true;
    let language = app.language;
    let source = app.source();
    let playground = playground.clone();
    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        let lines = playground.run(language, &source).await;
        let _ = event_tx.send(TuiEvent::RunFinished(lines));
    });
}
