//! Handle to a spawned VM process.

use std::process::ExitStatus;

use tokio::process::Child;

use super::{VmError, VmHandle};
use crate::debug;

/// A VM child process.
///
/// Dropping the handle before its exit was observed requests termination,
/// so a host that unwinds on an error path does not leave QEMU behind.
#[derive(Debug)]
pub struct VmProcess {
    child: Child,
    terminate_requested: bool,
    status: Option<ExitStatus>,
}

impl VmProcess {
    pub fn new(child: Child) -> Self {
        Self {
            child,
            terminate_requested: false,
            status: None,
        }
    }

    /// OS process id, `None` once the exit has been reaped.
    #[cfg(test)]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Has the exit been observed?
    #[cfg(test)]
    pub fn has_exited(&self) -> bool {
        self.status.is_some()
    }

    fn outcome(&self, status: ExitStatus) -> Result<(), VmError> {
        if status.success() || self.terminate_requested {
            Ok(())
        } else {
            Err(VmError::AbnormalExit {
                code: status.code(),
            })
        }
    }

    #[cfg(unix)]
    fn send_terminate(&mut self, pid: u32) -> Result<(), VmError> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            // Exited but not yet reaped.
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(VmError::Signal(errno.into())),
        }
    }

    #[cfg(not(unix))]
    fn send_terminate(&mut self, _pid: u32) -> Result<(), VmError> {
        self.child.start_kill().map_err(VmError::Signal)
    }
}

impl VmHandle for VmProcess {
    fn terminate(&mut self) -> Result<(), VmError> {
        self.terminate_requested = true;
        if self.status.is_some() {
            return Ok(());
        }
        match self.child.id() {
            Some(pid) => {
                debug!("vm"; "sending SIGTERM to {pid}");
                self.send_terminate(pid)
            }
            None => Ok(()),
        }
    }

    async fn wait(&mut self) -> Result<(), VmError> {
        let status = match self.status {
            Some(status) => status,
            None => {
                let status = self.child.wait().await.map_err(VmError::Wait)?;
                self.status = Some(status);
                status
            }
        };
        self.outcome(status)
    }
}

impl Drop for VmProcess {
    fn drop(&mut self) {
        if self.status.is_none() && self.child.id().is_some() {
            let _ = self.terminate();
        }
    }
}
