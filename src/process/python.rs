//! Python worker bootstrap and wire protocol.
//!
//! The worker is the user's Python interpreter running [`BOOTSTRAP`]:
//! newline-delimited JSON requests on stdin, one JSON reply per request on
//! stdout, and a handshake line on startup. Guest source crosses the wire
//! as an opaque JSON string — the worker never needs it re-indented or
//! otherwise rewritten.

use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use crate::error::RunnerError;

/// Serve loop executed with `python -u -c`.
///
/// Each request runs under `redirect_stdout`/`redirect_stderr` into
/// per-request buffers; the exception guard turns any guest-level failure
/// (including `SystemExit`) into one `Type: message` line on the error
/// stream instead of killing the worker. The module scope is shared across
/// requests, so guest programs can observe state left by previous runs.
/// Guest `input()` reads EOF: the real stdin carries the wire protocol and
/// is hidden from the snippet.
const BOOTSTRAP: &str = r#"
import io
import json
import sys
from contextlib import redirect_stdout, redirect_stderr

SCOPE = {"__name__": "__main__"}

requests = sys.stdin
sys.stdin = io.StringIO()

print(json.dumps({"ready": True, "version": sys.version.split()[0]}), flush=True)

for raw in requests:
    raw = raw.strip()
    if not raw:
        continue
    try:
        request = json.loads(raw)
    except ValueError:
        continue
    out = io.StringIO()
    err = io.StringIO()
    with redirect_stdout(out), redirect_stderr(err):
        try:
            exec(compile(request["code"], "<playground>", "exec"), SCOPE)
        except BaseException as exc:
            print("%s: %s" % (type(exc).__name__, exc), file=sys.stderr)
    reply = {"id": request["id"], "stdout": out.getvalue(), "stderr": err.getvalue()}
    print(json.dumps(reply), flush=True)
"#;

#[derive(Debug, Serialize)]
struct ExecRequest<'a> {
    id: u64,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExecReply {
    id: u64,
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
}

#[derive(Debug, Deserialize)]
struct Handshake {
    ready: bool,
    #[serde(default)]
    version: String,
}

/// Captured streams of one guest run, observed after execution completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

struct WorkerIo {
    // Held so the process is killed when the handle is dropped.
    _child: Child,
    stdin: ChildStdin,
    replies: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

/// A booted worker. Requests are serialized behind the io mutex: the wire
/// protocol has no interleaving, and the playground never overlaps runs
/// anyway.
pub struct PythonRuntime {
    version: String,
    io: tokio::sync::Mutex<WorkerIo>,
}

impl std::fmt::Debug for PythonRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonRuntime")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl PythonRuntime {
    pub fn version(&self) -> &str {
        &self.version
    }

    /// One request/reply round-trip. A broken pipe or closed stream means
    /// the worker died; callers reset the shared handle on that error.
    pub async fn execute(&self, source: &str) -> Result<ExecOutput, RunnerError> {
        let mut io = self.io.lock().await;
        io.next_id += 1;
        let id = io.next_id;

        let request = serde_json::to_string(&ExecRequest { id, code: source })
            .map_err(|e| RunnerError::RuntimeLost(e.to_string()))?;
        io.stdin
            .write_all(request.as_bytes())
            .await
            .map_err(lost)?;
        io.stdin.write_all(b"\n").await.map_err(lost)?;
        io.stdin.flush().await.map_err(lost)?;

        loop {
            let line = io
                .replies
                .next_line()
                .await
                .map_err(lost)?
                .ok_or_else(|| {
                    RunnerError::RuntimeLost("worker closed its output stream".into())
                })?;
            match serde_json::from_str::<ExecReply>(&line) {
                Ok(reply) if reply.id == id => {
                    return Ok(ExecOutput { stdout: reply.stdout, stderr: reply.stderr });
                }
                // Stale or malformed line: keep reading.
                _ => continue,
            }
        }
    }
}

fn lost(err: std::io::Error) -> RunnerError {
    RunnerError::RuntimeLost(err.to_string())
}

/// Spawn the worker and wait for its handshake under `boot_timeout`.
pub(crate) async fn start(
    bin: &str,
    boot_timeout: Duration,
) -> Result<PythonRuntime, RunnerError> {
    let mut child = Command::new(bin)
        .arg("-u")
        .arg("-c")
        .arg(BOOTSTRAP)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| RunnerError::BootFailed(format!("failed to spawn {bin}: {e}")))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| RunnerError::BootFailed("worker stdin unavailable".into()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::BootFailed("worker stdout unavailable".into()))?;
    let mut replies = BufReader::new(stdout).lines();

    let hello = timeout(boot_timeout, replies.next_line())
        .await
        .map_err(|_| {
            RunnerError::BootFailed(format!(
                "worker did not answer within {}s",
                boot_timeout.as_secs()
            ))
        })?
        .map_err(|e| RunnerError::BootFailed(e.to_string()))?
        .ok_or_else(|| RunnerError::BootFailed("worker exited during startup".into()))?;

    let handshake: Handshake = serde_json::from_str(&hello)
        .map_err(|e| RunnerError::BootFailed(format!("bad handshake: {e}")))?;
    if !handshake.ready {
        return Err(RunnerError::BootFailed("worker reported not ready".into()));
    }
    tracing::debug!(version = %handshake.version, "python worker ready");

    Ok(PythonRuntime {
        version: handshake.version,
        io: tokio::sync::Mutex::new(WorkerIo {
            _child: child,
            stdin,
            replies,
            next_id: 0,
        }),
    })
}
