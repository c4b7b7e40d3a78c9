//! Secondary-interpreter backend: Python on the shared worker runtime.

use crate::error::RunnerError;
use crate::process::RuntimeLoader;
use crate::transcript::LogLine;

/// Execute a Python snippet on the shared worker and return its transcript.
///
/// Stdout lines are tagged `OUTPUT` and stderr lines `ERROR`, stdout first:
/// the worker reports both buffers only after the snippet finishes, so the
/// transcript cannot interleave them live. A silent run yields exactly one
/// `INFO` line.
pub async fn run(loader: &RuntimeLoader, source: &str) -> Vec<LogLine> {
    let mut lines = Vec::new();

    if loader.cached().is_none() {
        lines.push(LogLine::info("Initializing Python runtime..."));
    }
    let runtime = match loader.ensure_ready().await {
        Ok(runtime) => runtime,
        Err(err) => {
            lines.push(LogLine::error(format!(
                "Failed to initialize Python runtime: {err}"
            )));
            return lines;
        }
    };

    match runtime.execute(source).await {
        Ok(output) => {
            let stdout: Vec<&str> = non_blank_lines(&output.stdout);
            let stderr: Vec<&str> = non_blank_lines(&output.stderr);
            for line in &stdout {
                lines.push(LogLine::output(*line));
            }
            for line in &stderr {
                lines.push(LogLine::error(*line));
            }
            if stdout.is_empty() && stderr.is_empty() {
                lines.push(LogLine::info("Code executed successfully (no output)"));
            }
        }
        Err(err) => {
            if matches!(err, RunnerError::RuntimeLost(_)) {
                // Dead worker: drop the handle so the next run boots anew.
                loader.reset();
            }
            lines.push(LogLine::error(err.to_string()));
        }
    }

    lines
}

fn non_blank_lines(buffer: &str) -> Vec<&str> {
    buffer.lines().filter(|l| !l.trim().is_empty()).collect()
}
