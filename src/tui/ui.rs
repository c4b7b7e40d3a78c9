//! UI layout and rendering logic for the playground TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::App;
use crate::execution::Language;
use crate::process::LoaderStatus;
use crate::transcript::Tag;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Editor and output panes
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_layout[0]);

    render_editor(frame, app, panes[0]);
    render_output(frame, app, panes[1]);
    render_status_bar(frame, app, main_layout[1]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Render the code editor pane, with the cursor placed on the frame.
fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("Editor — {}", app.language.display_name());

    let visible_height = area.height.saturating_sub(2) as usize;
    let scroll_y = app.row.saturating_sub(visible_height.saturating_sub(1));

    let lines: Vec<Line> = app
        .buffer
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(Color::Green))))
        .collect();

    let editor = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll_y as u16, 0));

    frame.render_widget(editor, area);

    // Place the terminal cursor at the editing position
    let line = &app.buffer[app.row];
    let prefix: String = line.chars().take(app.col).collect();
    let x = (area.x as usize)
        .saturating_add(1)
        .saturating_add(prefix.width())
        .min(u16::MAX as usize) as u16;
    let y = area.y + 1 + (app.row - scroll_y) as u16;
    if x < area.right() && y < area.bottom() {
        frame.set_cursor_position(Position::new(x, y));
    }
}

/// Render the output pane: the transcript of the last run, colored by tag.
fn render_output(frame: &mut Frame, app: &App, area: Rect) {
    let mut content_lines: Vec<Line> = Vec::new();

    if app.output.is_empty() {
        content_lines.push(Line::from(Span::styled(
            "Output will appear here when you run your code...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
        if app.language == Language::Python && !app.runtime_cached {
            let hint = match app.runtime_status {
                LoaderStatus::Error => "Python runtime unavailable",
                LoaderStatus::Ready => "Python runtime located",
                _ => "Loading Python runtime...",
            };
            content_lines.push(Line::from(""));
            content_lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Yellow),
            )));
        }
    } else {
        for log in &app.output {
            let style = Style::default().fg(tag_color(log.tag));
            // A log line may carry embedded newlines (e.g. a logged object)
            let rendered = log.to_string();
            for line in rendered.lines() {
                content_lines.push(Line::from(Span::styled(line.to_string(), style)));
            }
        }
    }

    if app.is_running {
        content_lines.push(Line::from(Span::styled(
            "Running...",
            Style::default().fg(Color::Yellow),
        )));
    }

    let available_height = area.height.saturating_sub(2) as usize;
    let total_lines = content_lines.len();

    let mut paragraph = Paragraph::new(Text::from(content_lines))
        .block(Block::default().borders(Borders::ALL).title("Output"))
        .wrap(Wrap { trim: false });

    if total_lines > available_height {
        // Offset 0 sticks to the bottom; manual scrolling moves up from it
        let max_scroll = total_lines.saturating_sub(available_height);
        let offset = app.output_scroll.min(max_scroll);
        let scroll_y = (max_scroll - offset) as u16;
        paragraph = paragraph.scroll((scroll_y, 0));
    }

    frame.render_widget(paragraph, area);
}

fn tag_color(tag: Tag) -> Color {
    match tag {
        Tag::Output => Color::Green,
        Tag::Error => Color::Red,
        Tag::Warn => Color::Yellow,
        Tag::Return => Color::Blue,
        Tag::Info => Color::Cyan,
    }
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut status = format!(
        "{} | F5 run · F2 language · Ctrl+L clear · F1 help · Ctrl+C quit",
        app.language.display_name()
    );
    if app.is_running {
        status.push_str(" | running...");
    } else if app.language == Language::Python && !app.runtime_cached {
        status.push_str(&format!(" | python: {}", app.runtime_status));
    }

    let status_paragraph =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();
    let popup_area = centered_rect(70, 60, area);

    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Playground Help"),
        Line::from(""),
        Line::from("  F5 / Ctrl+Enter  - Run the current snippet"),
        Line::from("  F2               - Switch language (resets the editor)"),
        Line::from("  Ctrl+L           - Clear the output pane"),
        Line::from("  Tab              - Insert two spaces"),
        Line::from("  PgUp/PgDn        - Scroll the output pane"),
        Line::from("  F1               - Toggle this help"),
        Line::from("  Ctrl+C           - Quit"),
        Line::from(""),
        Line::from("JavaScript runs in-process; Python boots a worker on"),
        Line::from("first use and keeps state between runs."),
        Line::from(""),
        Line::from("Press any key to close"),
    ];

    let help = Paragraph::new(Text::from(help_lines))
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

/// Create a centered rect using up certain percentage of the available rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
