//! Execution engine: guest languages, backend dispatch, busy flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::RunnerError;
use crate::process::{LoaderStatus, RuntimeLoader};
use crate::transcript::{LogLine, Tag};

pub mod python;
pub mod script;

/// A guest language the playground can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    Python,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
        }
    }

    /// Accepts the usual spellings; anything else is an unsupported tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "js" | "javascript" => Some(Language::JavaScript),
            "py" | "python" => Some(Language::Python),
            _ => None,
        }
    }

    /// Starter snippet shown when the editor switches to this language.
    pub fn default_snippet(self) -> &'static str {
        match self {
            Language::JavaScript => "console.log(\"Hello, World!\");",
            Language::Python => "print(\"Hello, World!\")",
        }
    }
}

/// The dispatcher: routes a submission to its backend and always comes back
/// with a transcript, never a raised error.
///
/// Cheap to clone; every clone shares the process-wide runtime loader and
/// the busy flag. The busy flag is the only guard against overlapping runs:
/// the UI must not trigger `run` while `is_busy()` — the playground does
/// not queue concurrent calls.
#[derive(Clone)]
pub struct Playground {
    loader: RuntimeLoader,
    busy: Arc<AtomicBool>,
}

impl Playground {
    pub fn new(cfg: &Config) -> Self {
        let playground = Self::with_loader(RuntimeLoader::shared(cfg));
        if cfg.warm_start() {
            playground.loader.prefetch();
        }
        playground
    }

    /// Build against a private loader; used by tests.
    pub fn with_loader(loader: RuntimeLoader) -> Self {
        Self { loader, busy: Arc::new(AtomicBool::new(false)) }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Probe status of the Python runtime, for UI hints.
    pub fn runtime_status(&self) -> LoaderStatus {
        self.loader.status()
    }

    /// Whether the Python worker is already booted.
    pub fn runtime_cached(&self) -> bool {
        self.loader.cached().is_some()
    }

    /// Called when the UI switches language; switching to Python warms the
    /// runtime in the background without blocking.
    pub fn select_language(&self, language: Language) {
        if language == Language::Python {
            self.loader.warm_up();
        }
    }

    /// Wait for the interpreter probe to settle. One-shot callers need
    /// this before a cold Python run; the TUI relies on `select_language`
    /// instead.
    pub async fn prepare(&self, language: Language) {
        if language == Language::Python {
            self.loader.locate().await;
        }
    }

    /// Execute `source` in `language` and return the transcript.
    pub async fn run(&self, language: Language, source: &str) -> Vec<LogLine> {
        let _busy = BusyGuard::engage(&self.busy);
        tracing::debug!(language = language.as_str(), bytes = source.len(), "run");
        match language {
            Language::JavaScript => script::run(source),
            Language::Python => python::run(&self.loader, source).await,
        }
    }

    /// Like [`run`](Self::run), from a textual language tag. An unknown tag
    /// yields a single-line error transcript.
    pub async fn run_tagged(&self, tag: &str, source: &str) -> Vec<LogLine> {
        match Language::parse(tag) {
            Some(language) => self.run(language, source).await,
            None => vec![LogLine::new(
                Tag::Error,
                RunnerError::UnsupportedLanguage(tag.to_string()).to_string(),
            )],
        }
    }
}

/// Raises the busy flag for the duration of one run, on every exit path.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag: Arc::clone(flag) }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_tags() {
        assert_eq!(Language::parse("js"), Some(Language::JavaScript));
        assert_eq!(Language::parse("JavaScript"), Some(Language::JavaScript));
        assert_eq!(Language::parse("PY"), Some(Language::Python));
        assert_eq!(Language::parse("python"), Some(Language::Python));
        assert_eq!(Language::parse("ruby"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn busy_guard_resets_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        {
            let _guard = BusyGuard::engage(&flag);
            assert!(flag.load(Ordering::SeqCst));
        }
        assert!(!flag.load(Ordering::SeqCst));
    }
}
