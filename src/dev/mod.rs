//! `ftl dev` session: one cycle at startup, then one per debounced change.
//!
//! Architecture:
//! ```text
//! EventSource → Debouncer → Orchestrator::prepare → launch → Launcher
//!                              ▲
//!          Ctrl+C ─────────────┴── shutdown: terminate + bounded wait
//! ```
//!
//! Cycles are awaited inside the event loop, so they never overlap and
//! changes arriving during a build are handled once it finishes.

mod orchestrator;


pub use orchestrator::{CycleError, Orchestrator, Rebuild, SHUTDOWN_GRACE};

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;

use crate::logger::{clear_screen, status_error, status_success, status_warning};
use crate::vm::{Launcher, VmError};
use crate::watch::{Debouncer, EventSource, WatchError};
use crate::{debug, log};

/// Dev-loop state: orchestrator, change source and debouncer.
pub struct Session<R, L: Launcher, S> {
    orchestrator: Orchestrator<R, L>,
    source: S,
    debouncer: Debouncer,
    grace: Duration,
}

impl<R, L, S> Session<R, L, S>
where
    R: Rebuild,
    L: Launcher,
    S: EventSource,
{
    pub fn new(orchestrator: Orchestrator<R, L>, source: S, debouncer: Debouncer) -> Self {
        Self {
            orchestrator,
            source,
            debouncer,
            grace: SHUTDOWN_GRACE,
        }
    }

    /// Run until `shutdown` resolves or the change source fails.
    ///
    /// Either way the current VM is terminated before returning.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<(), WatchError> {
        tokio::pin!(shutdown);

        log!("watch"; "Watching for changes in {}...", self.debouncer.filter().root().display());
        if !self.run_cycle(None, shutdown.as_mut()).await {
            self.orchestrator.shutdown(self.grace).await;
            return Ok(());
        }

        let result = loop {
            let deadline = self.debouncer.deadline();

            tokio::select! {
                biased;

                _ = &mut shutdown => break Ok(()),

                event = self.source.next_event() => match event {
                    Ok(event) => {
                        self.debouncer.on_event(&event, Instant::now());
                    }
                    Err(err) => break Err(err),
                },

                _ = sleep_until(deadline) => {
                    if let Some(path) = self.debouncer.fire(Instant::now())
                        && !self.run_cycle(Some(&path), shutdown.as_mut()).await
                    {
                        break Ok(());
                    }
                }

                exit = self.orchestrator.observe_exit() => report_exit(exit),
            }
        };

        self.orchestrator.shutdown(self.grace).await;
        result
    }

    /// Returns `false` when `shutdown` resolved before the new VM launched.
    async fn run_cycle<F>(&mut self, changed: Option<&Path>, shutdown: Pin<&mut F>) -> bool
    where
        F: Future<Output = ()>,
    {
        clear_screen();
        if let Some(path) = changed {
            let shown = path
                .strip_prefix(self.debouncer.filter().root())
                .unwrap_or(path);
            log!("dev"; "Changed: {}", shown.display());
        }

        let prepared = tokio::select! {
            biased;

            () = shutdown => {
                debug!("dev"; "shutdown requested during build, not launching");
                return false;
            }

            prepared = self.orchestrator.prepare() => prepared,
        };

        match prepared.and_then(|()| self.orchestrator.launch()) {
            Ok(()) => status_success("build complete, VM launched"),
            Err(CycleError::Build(err)) => {
                let summary = match err.artifact() {
                    Some(artifact) => format!("build failed at `{artifact}`"),
                    None => "build failed".to_owned(),
                };
                status_error(&summary, &error_chain(&err));
            }
            Err(CycleError::Vm(err)) if err.is_launch_failure() => {
                status_error("VM launch failed", &error_chain(&err));
            }
            Err(CycleError::Vm(err)) => status_error("VM restart failed", &error_chain(&err)),
            Err(err @ CycleError::Aborted(_)) => status_error("build failed", &err.to_string()),
        }
        true
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn report_exit(exit: Result<(), VmError>) {
    match exit {
        Ok(()) => {
            debug!("vm"; "VM exited");
            status_warning("VM exited, waiting for changes");
        }
        Err(err) => status_error(&err.to_string(), "waiting for changes"),
    }
}

/// `err: cause: cause` on one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
