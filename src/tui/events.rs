//! Custom event types for the playground TUI.

use crossterm::event::KeyEvent;

use crate::transcript::LogLine;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// A run finished; its transcript replaces the output pane
    RunFinished(Vec<LogLine>),
}
