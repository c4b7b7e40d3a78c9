//! Python worker runtime: discovery, boot deduplication, shared handle.
//!
//! The worker is expensive to start, so it is booted at most once per
//! process and shared by every playground instance. [`InterpreterProbe`]
//! locates a usable interpreter in the background; [`RuntimeLoader`] owns
//! the single-flight boot and the cached [`RuntimeHandle`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::process::Command;
use tokio::sync::watch;

use crate::config::Config;
use crate::error::RunnerError;

pub mod python;

pub use python::PythonRuntime;

/// Shared-ownership reference to the booted worker.
pub type RuntimeHandle = Arc<PythonRuntime>;

/// Where the interpreter probe currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

impl fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoaderStatus::Idle => "idle",
            LoaderStatus::Loading => "loading",
            LoaderStatus::Ready => "ready",
            LoaderStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Locates a usable Python interpreter without blocking the caller.
///
/// Runs at most once per process; `kick()` is idempotent. Candidates are
/// checked in order by asking each to print its version.
pub struct InterpreterProbe {
    candidates: Vec<String>,
    status: watch::Sender<LoaderStatus>,
    resolved: OnceLock<String>,
    kicked: AtomicBool,
}

impl InterpreterProbe {
    pub fn new(candidates: Vec<String>) -> Self {
        let (status, _) = watch::channel(LoaderStatus::Idle);
        Self {
            candidates,
            status,
            resolved: OnceLock::new(),
            kicked: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> LoaderStatus {
        *self.status.borrow()
    }

    /// The interpreter that answered the probe, once status is `Ready`.
    pub fn interpreter(&self) -> Option<&str> {
        self.resolved.get().map(String::as_str)
    }

    /// Start probing in the background. Later calls are no-ops.
    pub fn kick(self: Arc<Self>) {
        if self.kicked.swap(true, Ordering::SeqCst) {
            return;
        }
        tokio::spawn(async move { self.locate().await });
    }

    async fn locate(&self) {
        self.status.send_replace(LoaderStatus::Loading);
        for bin in &self.candidates {
            let checked = Command::new(bin)
                .arg("-c")
                .arg("import sys; print(sys.version.split()[0])")
                .output()
                .await;
            match checked {
                Ok(out) if out.status.success() => {
                    let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
                    tracing::debug!(interpreter = %bin, %version, "located python interpreter");
                    let _ = self.resolved.set(bin.clone());
                    self.status.send_replace(LoaderStatus::Ready);
                    return;
                }
                _ => continue,
            }
        }
        tracing::warn!(candidates = ?self.candidates, "no usable python interpreter found");
        self.status.send_replace(LoaderStatus::Error);
    }

    /// Wait until the probe has finished, in either direction.
    pub async fn settled(&self) -> LoaderStatus {
        let mut rx = self.status.subscribe();
        loop {
            let status = *rx.borrow_and_update();
            if matches!(status, LoaderStatus::Ready | LoaderStatus::Error) {
                return status;
            }
            if rx.changed().await.is_err() {
                return self.status();
            }
        }
    }
}

type InitFuture<T> = Shared<BoxFuture<'static, Result<T, RunnerError>>>;

struct Slot<T> {
    cached: Option<T>,
    in_flight: Option<InitFuture<T>>,
}

/// Single-flight initialization cell.
///
/// Invariants: at most one init future runs at a time; concurrent callers
/// share its outcome; a success is cached for the life of the cell; a
/// failure clears the in-flight marker so the next call starts over.
pub struct SingleFlight<T: Clone> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot { cached: None, in_flight: None })),
        }
    }

    pub fn cached(&self) -> Option<T> {
        self.slot.lock().unwrap().cached.clone()
    }

    /// Drop the cached value (and any in-flight marker). The next call to
    /// `get_or_start` initializes from scratch.
    pub fn reset(&self) {
        let mut slot = self.slot.lock().unwrap();
        slot.cached = None;
        slot.in_flight = None;
    }

    /// Return the cached value, join an in-flight init, or start a new one.
    ///
    /// `start` is only invoked when a new init actually begins; returning
    /// an error from it (e.g. a precondition is not met) fails this call
    /// without recording anything.
    pub async fn get_or_start<F, Fut>(&self, start: F) -> Result<T, RunnerError>
    where
        F: FnOnce() -> Result<Fut, RunnerError>,
        Fut: std::future::Future<Output = Result<T, RunnerError>> + Send + 'static,
    {
        let shared = {
            let mut slot = self.slot.lock().unwrap();
            if let Some(value) = &slot.cached {
                return Ok(value.clone());
            }
            if let Some(pending) = &slot.in_flight {
                pending.clone()
            } else {
                let fut = start()?;
                let state = Arc::clone(&self.slot);
                // Bookkeeping runs inside the shared future, exactly once,
                // before any waiter observes completion.
                let shared = async move {
                    let result = fut.await;
                    let mut slot = state.lock().unwrap();
                    slot.in_flight = None;
                    if let Ok(value) = &result {
                        slot.cached = Some(value.clone());
                    }
                    result
                }
                .boxed()
                .shared();
                slot.in_flight = Some(shared.clone());
                shared
            }
        };
        shared.await
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct LoaderInner {
    probe: Arc<InterpreterProbe>,
    flight: SingleFlight<RuntimeHandle>,
    boot_timeout: Duration,
}

/// Owns the probe, the boot deduplication and the cached worker handle.
///
/// Cheap to clone; clones share state. One instance is shared process-wide
/// via [`RuntimeLoader::shared`]; tests build private instances with
/// [`RuntimeLoader::from_config`].
#[derive(Clone)]
pub struct RuntimeLoader {
    inner: Arc<LoaderInner>,
}

static SHARED: OnceLock<RuntimeLoader> = OnceLock::new();

impl RuntimeLoader {
    pub fn from_config(cfg: &Config) -> Self {
        let candidates = match cfg.python_bin() {
            Some(bin) => vec![bin],
            None => vec!["python3".to_string(), "python".to_string()],
        };
        Self {
            inner: Arc::new(LoaderInner {
                probe: Arc::new(InterpreterProbe::new(candidates)),
                flight: SingleFlight::new(),
                boot_timeout: cfg.boot_timeout(),
            }),
        }
    }

    /// The process-wide loader; created on first use.
    pub fn shared(cfg: &Config) -> RuntimeLoader {
        SHARED.get_or_init(|| Self::from_config(cfg)).clone()
    }

    pub fn status(&self) -> LoaderStatus {
        self.inner.probe.status()
    }

    pub fn cached(&self) -> Option<RuntimeHandle> {
        self.inner.flight.cached()
    }

    /// Drop the cached handle; used after the worker transport breaks so
    /// the next request boots a fresh one.
    pub fn reset(&self) {
        self.inner.flight.reset();
    }

    /// Start the interpreter probe without waiting on it.
    pub fn prefetch(&self) {
        Arc::clone(&self.inner.probe).kick();
    }

    /// Kick the probe and wait for it to settle. Used by one-shot callers
    /// that need Python on a cold start.
    pub async fn locate(&self) -> LoaderStatus {
        self.prefetch();
        self.inner.probe.settled().await
    }

    /// Probe and boot in the background, without blocking the caller.
    /// Failures are logged, not surfaced; a later `ensure_ready` reports
    /// them properly.
    pub fn warm_up(&self) {
        if self.cached().is_some() {
            return;
        }
        self.prefetch();
        let loader = self.clone();
        tokio::spawn(async move {
            if loader.inner.probe.settled().await == LoaderStatus::Ready {
                if let Err(err) = loader.ensure_ready().await {
                    tracing::debug!(%err, "background python warm-up failed");
                }
            }
        });
    }

    /// Return the shared worker handle, booting it if necessary.
    ///
    /// Concurrent callers before the first boot completes trigger exactly
    /// one boot and all receive the same outcome. A failed boot is not
    /// retried automatically; the next call starts a fresh attempt.
    pub async fn ensure_ready(&self) -> Result<RuntimeHandle, RunnerError> {
        let inner = &self.inner;
        inner
            .flight
            .get_or_start(|| {
                let status = inner.probe.status();
                if status != LoaderStatus::Ready {
                    return Err(RunnerError::NotReady(status));
                }
                let bin = inner.probe.interpreter().unwrap_or("python3").to_string();
                let timeout = inner.boot_timeout;
                Ok(async move { python::start(&bin, timeout).await.map(Arc::new) })
            })
            .await
    }
}
