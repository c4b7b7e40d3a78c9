//! Worker runtime properties: boot, execution, persistence, recovery.
//!
//! These tests need a Python interpreter on PATH and skip themselves when
//! none is available.

use std::sync::Arc;

use codepad::config::Config;
use codepad::execution::python;
use codepad::process::{LoaderStatus, RuntimeLoader};
use codepad::transcript::Tag;

fn python_available() -> bool {
    ["python3", "python"].iter().any(|bin| {
        std::process::Command::new(bin)
            .arg("--version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

async fn booted_loader() -> RuntimeLoader {
    let loader = RuntimeLoader::from_config(&Config::load());
    assert_eq!(loader.locate().await, LoaderStatus::Ready);
    loader.ensure_ready().await.expect("worker should boot");
    loader
}

#[tokio::test]
async fn print_yields_one_output_line() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    let lines = python::run(&loader, r#"print("hi")"#).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Output);
    assert_eq!(lines[0].text, "hi");
}

#[tokio::test]
async fn division_by_zero_reports_an_error_line() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    let lines = python::run(&loader, "1/0").await;
    let errors: Vec<_> = lines.iter().filter(|l| l.tag == Tag::Error).collect();
    assert!(!errors.is_empty());
    assert!(
        errors[0].text.contains("division"),
        "got: {}",
        errors[0].text
    );
}

#[tokio::test]
async fn silent_run_yields_exactly_one_info_line() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    let lines = python::run(&loader, "x = 41").await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Info);
    assert!(lines[0].text.contains("no output"), "got: {}", lines[0].text);
}

#[tokio::test]
async fn state_persists_between_runs() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    python::run(&loader, "x = 41").await;
    let lines = python::run(&loader, "print(x + 1)").await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Output);
    assert_eq!(lines[0].text, "42");
}

#[tokio::test]
async fn stdout_lines_precede_stderr_lines() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    let source = r#"
import sys
print("out one")
sys.stderr.write("err one\n")
print("out two")
"#;
    let lines = python::run(&loader, source).await;
    let tags: Vec<Tag> = lines.iter().map(|l| l.tag).collect();
    // Buffers are observed post-hoc: all stdout first, then stderr.
    assert_eq!(tags, vec![Tag::Output, Tag::Output, Tag::Error]);
    assert_eq!(lines[0].text, "out one");
    assert_eq!(lines[1].text, "out two");
    assert_eq!(lines[2].text, "err one");
}

#[tokio::test]
async fn guest_exception_does_not_kill_the_worker() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    let lines = python::run(&loader, r#"raise RuntimeError("guest says no")"#).await;
    assert!(lines
        .iter()
        .any(|l| l.tag == Tag::Error && l.text.contains("guest says no")));
    // The worker must still answer afterwards.
    let lines = python::run(&loader, r#"print("still alive")"#).await;
    assert_eq!(lines[0].text, "still alive");
}

#[tokio::test]
async fn concurrent_ensure_ready_boots_once() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = RuntimeLoader::from_config(&Config::load());
    assert_eq!(loader.locate().await, LoaderStatus::Ready);
    let (a, b, c) = tokio::join!(
        loader.ensure_ready(),
        loader.ensure_ready(),
        loader.ensure_ready(),
    );
    let a = a.unwrap();
    assert!(Arc::ptr_eq(&a, &b.unwrap()));
    assert!(Arc::ptr_eq(&a, &c.unwrap()));
}

#[tokio::test]
async fn dead_worker_is_reported_and_replaced() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    // Kill the worker from inside the guest.
    let lines = python::run(&loader, "import os; os._exit(1)").await;
    assert!(lines.iter().any(|l| l.tag == Tag::Error));
    // The handle was reset, so the next run boots a fresh worker.
    assert!(loader.cached().is_none());
    let lines = python::run(&loader, r#"print("back up")"#).await;
    assert_eq!(lines.last().unwrap().text, "back up");
}

#[tokio::test]
async fn handshake_reports_a_version() {
    if !python_available() {
        println!("Skipping test - no python interpreter available");
        return;
    }
    let loader = booted_loader().await;
    let runtime = loader.ensure_ready().await.unwrap();
    assert!(!runtime.version().is_empty());
}
