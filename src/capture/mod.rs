//! Scoped console capture for one guest execution.
//!
//! The sink stands in for the console channels while a snippet runs: every
//! write lands in an ordered buffer instead of the host's terminal. The
//! engine hooks that feed it live inside the per-run evaluation context, so
//! normal logging is untouched on every exit path.

use std::sync::{Arc, Mutex};

use crate::error::RunnerError;
use crate::transcript::{LogLine, Tag};

/// Clonable handle the evaluation engine writes through. Clones share one
/// buffer; writes keep their call order across channels.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, tag: Tag, text: impl Into<String>) {
        self.lines.lock().unwrap().push(LogLine::new(tag, text));
    }

    fn take(&self) -> Vec<LogLine> {
        std::mem::take(&mut self.lines.lock().unwrap())
    }
}

/// Outcome of a captured execution: the value `f` produced (if it did) and
/// every line written while it ran.
#[derive(Debug)]
pub struct Captured<T> {
    pub value: Option<T>,
    pub lines: Vec<LogLine>,
}

/// Run `f` with a fresh sink and collect everything it wrote.
///
/// If `f` fails, the failure is appended as one `ERROR` line after the
/// output that was already captured, and the error stops here — callers get
/// a transcript either way, never an unwinding error.
pub fn with_capture<T>(
    f: impl FnOnce(&ConsoleSink) -> Result<T, RunnerError>,
) -> Captured<T> {
    let sink = ConsoleSink::new();
    match f(&sink) {
        Ok(value) => Captured { value: Some(value), lines: sink.take() },
        Err(err) => {
            sink.write(Tag::Error, err.to_string());
            Captured { value: None, lines: sink.take() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_write_order_across_channels() {
        let captured = with_capture(|sink| {
            sink.write(Tag::Output, "one");
            sink.write(Tag::Warn, "two");
            sink.write(Tag::Error, "three");
            sink.write(Tag::Output, "four");
            Ok(())
        });
        let tags: Vec<Tag> = captured.lines.iter().map(|l| l.tag).collect();
        assert_eq!(tags, vec![Tag::Output, Tag::Warn, Tag::Error, Tag::Output]);
    }

    #[test]
    fn failure_keeps_prior_output_and_appends_one_error() {
        let captured: Captured<()> = with_capture(|sink| {
            sink.write(Tag::Output, "before");
            Err(RunnerError::Guest("boom".into()))
        });
        assert!(captured.value.is_none());
        assert_eq!(captured.lines.len(), 2);
        assert_eq!(captured.lines[0], LogLine::output("before"));
        assert_eq!(captured.lines[1], LogLine::error("boom"));
    }

    #[test]
    fn clones_share_one_buffer() {
        let sink = ConsoleSink::new();
        let clone = sink.clone();
        sink.write(Tag::Output, "a");
        clone.write(Tag::Output, "b");
        let lines = sink.take();
        assert_eq!(lines.len(), 2);
    }
}
