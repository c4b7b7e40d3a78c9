//! TUI application state management.

use crate::execution::Language;
use crate::process::LoaderStatus;
use crate::transcript::LogLine;

/// Application state for the playground TUI: a small multi-line editor,
/// the transcript of the last run, and runtime hints for the status bar.
#[derive(Debug)]
pub struct App {
    /// Selected guest language
    pub language: Language,
    /// Editor content, one entry per line (never empty)
    pub buffer: Vec<String>,
    /// Cursor line
    pub row: usize,
    /// Cursor column, in characters
    pub col: usize,
    /// Transcript shown in the output pane (replaced on every run)
    pub output: Vec<LogLine>,
    /// Scroll offset for the output pane (0 = stick to bottom)
    pub output_scroll: usize,
    /// Whether a run is outstanding (the run trigger is disabled)
    pub is_running: bool,
    /// Probe status of the Python runtime, refreshed every tick
    pub runtime_status: LoaderStatus,
    /// Whether the Python worker is already booted
    pub runtime_cached: bool,
    /// Whether to show the help overlay
    pub show_help: bool,
}

impl App {
    pub fn new(language: Language) -> Self {
        let mut app = Self {
            language,
            buffer: vec![String::new()],
            row: 0,
            col: 0,
            output: Vec::new(),
            output_scroll: 0,
            is_running: false,
            runtime_status: LoaderStatus::Idle,
            runtime_cached: false,
            show_help: false,
        };
        app.load_snippet();
        app
    }

    /// The full editor content, as submitted to the playground.
    pub fn source(&self) -> String {
        self.buffer.join("\n")
    }

    /// Switch language: the editor is reset to the language's starter
    /// snippet and the output pane is cleared, like a fresh pad.
    pub fn set_language(&mut self, language: Language) {
        if self.language == language {
            return;
        }
        self.language = language;
        self.load_snippet();
        self.output.clear();
        self.output_scroll = 0;
    }

    fn load_snippet(&mut self) {
        self.buffer = self
            .language
            .default_snippet()
            .lines()
            .map(str::to_string)
            .collect();
        if self.buffer.is_empty() {
            self.buffer.push(String::new());
        }
        self.row = self.buffer.len() - 1;
        self.col = char_count(&self.buffer[self.row]);
    }

    /// Replace the output pane with the transcript of a finished run.
    pub fn set_output(&mut self, lines: Vec<LogLine>) {
        self.output = lines;
        self.output_scroll = 0;
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
        self.output_scroll = 0;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ----- Output scrolling -----

    pub fn scroll_output_up(&mut self, lines: usize) {
        self.output_scroll += lines;
    }

    pub fn scroll_output_down(&mut self, lines: usize) {
        self.output_scroll = self.output_scroll.saturating_sub(lines);
    }

    // ----- Editor editing helpers -----

    pub fn insert_char(&mut self, c: char) {
        let idx = byte_index(&self.buffer[self.row], self.col);
        self.buffer[self.row].insert(idx, c);
        self.col += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let idx = byte_index(&self.buffer[self.row], self.col);
        self.buffer[self.row].insert_str(idx, s);
        self.col += s.chars().count();
    }

    pub fn newline(&mut self) {
        let idx = byte_index(&self.buffer[self.row], self.col);
        let rest = self.buffer[self.row].split_off(idx);
        self.buffer.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let idx = byte_index(&self.buffer[self.row], self.col - 1);
            self.buffer[self.row].remove(idx);
            self.col -= 1;
        } else if self.row > 0 {
            // Merge with the previous line
            let current = self.buffer.remove(self.row);
            self.row -= 1;
            self.col = char_count(&self.buffer[self.row]);
            self.buffer[self.row].push_str(&current);
        }
    }

    pub fn delete(&mut self) {
        if self.col < char_count(&self.buffer[self.row]) {
            let idx = byte_index(&self.buffer[self.row], self.col);
            self.buffer[self.row].remove(idx);
        } else if self.row + 1 < self.buffer.len() {
            let next = self.buffer.remove(self.row + 1);
            self.buffer[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = char_count(&self.buffer[self.row]);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < char_count(&self.buffer[self.row]) {
            self.col += 1;
        } else if self.row + 1 < self.buffer.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(char_count(&self.buffer[self.row]));
        } else {
            self.col = 0;
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.buffer.len() {
            self.row += 1;
            self.col = self.col.min(char_count(&self.buffer[self.row]));
        } else {
            self.col = char_count(&self.buffer[self.row]);
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = char_count(&self.buffer[self.row]);
    }
}

fn char_count(line: &str) -> usize {
    line.chars().count()
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_the_language_snippet() {
        let app = App::new(Language::JavaScript);
        assert_eq!(app.source(), Language::JavaScript.default_snippet());
    }

    #[test]
    fn language_switch_resets_editor_and_output() {
        let mut app = App::new(Language::JavaScript);
        app.set_output(vec![LogLine::output("hi")]);
        app.set_language(Language::Python);
        assert_eq!(app.source(), Language::Python.default_snippet());
        assert!(app.output.is_empty());
        // Switching to the current language is a no-op
        app.insert_char('#');
        app.set_language(Language::Python);
        assert!(app.source().contains('#'));
    }

    #[test]
    fn newline_and_backspace_merge_correctly() {
        let mut app = App::new(Language::Python);
        app.move_end();
        app.newline();
        app.insert_str("x = 1");
        assert_eq!(app.source(), "print(\"Hello, World!\")\nx = 1");
        app.move_home();
        app.backspace();
        assert_eq!(app.source(), "print(\"Hello, World!\")x = 1");
    }

    #[test]
    fn cursor_tracks_multibyte_characters() {
        let mut app = App::new(Language::JavaScript);
        app.buffer = vec!["héllo".to_string()];
        app.row = 0;
        app.col = 2;
        app.insert_char('x');
        assert_eq!(app.buffer[0], "héxllo");
    }
}
