//! One rebuild-and-relaunch cycle at a time.
//!
//! ```text
//! prepare: terminate old → build → (fail: stop, old keeps exiting)
//!                                → wait old exit
//! launch:  launch new
//! ```
//!
//! The old VM is asked to stop before the build so the two overlap in
//! time, but the new VM starts only after the old exit was observed: two
//! VMs are never alive together.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::build::{BuildError, Pipeline, Toolchain};
use crate::utils::exec::StdinPolicy;
use crate::vm::{Launcher, VmError, VmHandle};
use crate::{debug, log};

/// How long shutdown waits for the VM after asking it to stop.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Why a cycle ended without a running VM.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Vm(#[from] VmError),

    /// The blocking build task panicked or was cancelled.
    #[error("build task aborted")]
    Aborted(#[source] tokio::task::JoinError),
}

/// A full build pass, runnable on the blocking pool.
pub trait Rebuild: Send + Sync + 'static {
    fn rebuild(&self) -> Result<(), BuildError>;
}

impl<T> Rebuild for Pipeline<T>
where
    T: Toolchain + Send + Sync + 'static,
{
    fn rebuild(&self) -> Result<(), BuildError> {
        self.run().map(|_| ())
    }
}

/// Owns the current VM and sequences cycles.
pub struct Orchestrator<R, L: Launcher> {
    builder: Arc<R>,
    launcher: L,
    current: Option<L::Handle>,
    /// The exit of `current` was already observed.
    exited: bool,
    /// `current` was asked to stop; its exit is not reported.
    stopping: bool,
}

impl<R: Rebuild, L: Launcher> Orchestrator<R, L> {
    pub fn new(builder: R, launcher: L) -> Self {
        Self {
            builder: Arc::new(builder),
            launcher,
            current: None,
            exited: false,
            stopping: false,
        }
    }

    /// Is a VM running or exiting?
    #[cfg(test)]
    pub fn has_vm(&self) -> bool {
        self.current.is_some() && !self.exited
    }

    /// Run one cycle. On a build failure the previous VM is left exiting and
    /// no new one is launched.
    #[cfg(test)]
    pub async fn cycle(&mut self) -> Result<(), CycleError> {
        self.prepare().await?;
        self.launch()
    }

    /// First half of a cycle: stop the old VM, build, and wait for the old
    /// exit. Dropping the future mid-build leaves the old VM stopping.
    pub async fn prepare(&mut self) -> Result<(), CycleError> {
        if let Some(old) = self.current.as_mut()
            && !self.exited
        {
            debug!("dev"; "stopping previous VM");
            self.stopping = true;
            old.terminate()?;
        }

        let builder = Arc::clone(&self.builder);
        tokio::task::spawn_blocking(move || builder.rebuild())
            .await
            .map_err(CycleError::Aborted)??;

        if let Some(old) = self.current.as_mut()
            && !self.exited
        {
            // Terminated above, so any exit counts as clean.
            old.wait().await?;
            self.exited = true;
            debug!("dev"; "previous VM exited");
        }
        Ok(())
    }

    /// Second half of a cycle: launch the new VM. Call after `prepare`.
    pub fn launch(&mut self) -> Result<(), CycleError> {
        let handle = self.launcher.launch(StdinPolicy::Null)?;
        self.current = Some(handle);
        self.exited = false;
        self.stopping = false;
        Ok(())
    }

    /// Resolve when the current VM exits on its own; pending forever when
    /// there is none, its exit was already reported, or we stopped it.
    ///
    /// Cancel-safe.
    pub async fn observe_exit(&mut self) -> Result<(), VmError> {
        match self.current.as_mut() {
            Some(handle) if !self.exited => {
                let result = handle.wait().await;
                self.exited = true;
                if self.stopping {
                    debug!("vm"; "stopped VM exited");
                    return std::future::pending().await;
                }
                result
            }
            _ => std::future::pending().await,
        }
    }

    /// Stop the current VM, waiting at most `grace` for it to exit.
    pub async fn shutdown(&mut self, grace: Duration) {
        let Some(mut handle) = self.current.take() else {
            return;
        };
        if self.exited {
            return;
        }

        log!("vm"; "stopping VM");
        if let Err(err) = handle.terminate() {
            log!("error"; "{}", err);
        }
        match tokio::time::timeout(grace, handle.wait()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => log!("error"; "{}", err),
            Err(_) => log!("vm"; "VM did not exit within {}s", grace.as_secs()),
        }
    }
}
