use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use std::io::{self, Read};

use codepad::cli;
use codepad::config::Config;
use codepad::execution::{Language, Playground};
use codepad::printer::TranscriptPrinter;
use codepad::tui;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Optional: override the interpreter binary via CLI before loading config
    if let Some(bin) = args.python_bin.as_deref() {
        std::env::set_var("CODEPAD_PYTHON_BIN", bin);
    }

    let cfg = Config::load();

    // One-shot source: --eval, a file argument, or piped stdin.
    let stdin_is_tty = io::stdin().is_terminal();
    let source = if let Some(snippet) = &args.eval {
        Some(snippet.clone())
    } else if let Some(file) = &args.file {
        let text = std::fs::read_to_string(file)
            .map_err(|e| anyhow!("cannot read {}: {}", file, e))?;
        Some(text)
    } else if !stdin_is_tty {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        if buf.trim().is_empty() { None } else { Some(buf) }
    } else {
        None
    };

    init_tracing(source.is_none());

    // Language tag: explicit flag, then file extension, then config default.
    let tag = args
        .language
        .clone()
        .or_else(|| args.file.as_deref().and_then(infer_language))
        .unwrap_or_else(|| cfg.default_language());

    match source {
        Some(source) => {
            let playground = Playground::new(&cfg);
            if let Some(language) = Language::parse(&tag) {
                // Cold start: give the interpreter probe a chance to settle
                // before a Python run is attempted.
                playground.prepare(language).await;
            }
            let lines = playground.run_tagged(&tag, &source).await;
            let color = !args.no_color && io::stdout().is_terminal();
            TranscriptPrinter { color }.print(&lines);
            Ok(())
        }
        None => {
            let start = Language::parse(&tag)
                .ok_or_else(|| anyhow!("unsupported language: {}", tag))?;
            tui::run_playground(&cfg, start).await
        }
    }
}

fn infer_language(path: &str) -> Option<String> {
    let ext = std::path::Path::new(path).extension()?.to_str()?;
    match ext.to_ascii_lowercase().as_str() {
        "js" | "mjs" => Some("javascript".to_string()),
        "py" => Some("python".to_string()),
        _ => None,
    }
}

fn init_tracing(tui_mode: bool) {
    // Diagnostics are opt-in under the TUI so raw mode output stays clean.
    let fallback = if tui_mode { "off" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("CODEPAD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
