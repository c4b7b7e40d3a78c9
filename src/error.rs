//! Error taxonomy for the execution engine.

use thiserror::Error;

use crate::process::LoaderStatus;

/// Everything that can go wrong below the application boundary.
///
/// Variants are `Clone` because a single failed boot future fans its error
/// out to every caller waiting on it. None of these ever escape
/// [`Playground::run`](crate::execution::Playground::run) as a raised error;
/// they all end up as one `ERROR` line in the transcript.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunnerError {
    /// The interpreter probe has not reached `Ready` yet.
    #[error("Python runtime is not ready (interpreter status: {0})")]
    NotReady(LoaderStatus),

    /// The worker failed to start or to answer the handshake.
    #[error("Python runtime failed to start: {0}")]
    BootFailed(String),

    /// The worker was running but its pipes broke mid-use.
    #[error("Python runtime exited unexpectedly: {0}")]
    RuntimeLost(String),

    /// Guest code raised, or the engine rejected the source outright.
    #[error("{0}")]
    Guest(String),

    /// The dispatcher received a language tag it does not know.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}
