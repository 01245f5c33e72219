//! VM supervision: launch QEMU with the project's template, request
//! termination, observe the exit.
//!
//! The dev loop only talks to the [`Launcher`] and [`VmHandle`] traits, so
//! it can be driven by fakes in tests.

mod args;
mod process;
mod qemu;
mod storage;

pub use args::{Peripheral, QemuArgs};
pub use process::VmProcess;
pub use qemu::Qemu;
pub use storage::ensure_backing_file;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::exec::{StdinPolicy, describe_exit};

/// Errors from launching or supervising the VM.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("VM binary `{program}` not found")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to prepare storage backing file {}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("VM exited unexpectedly with {}", describe_exit(*.code))]
    AbnormalExit { code: Option<i32> },

    #[error("failed to wait for the VM")]
    Wait(#[source] io::Error),

    #[error("failed to signal the VM")]
    Signal(#[source] io::Error),
}

impl VmError {
    /// Launch failures: the VM never started.
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Spawn { .. } | Self::Storage { .. }
        )
    }
}

/// A running VM.
///
/// Both methods may be called any number of times. `wait` is cancel-safe:
/// dropping the future leaves the handle usable.
#[allow(async_fn_in_trait)]
pub trait VmHandle {
    /// Ask the VM to stop. Returns without waiting for the exit.
    fn terminate(&mut self) -> Result<(), VmError>;

    /// Resolve once the VM has exited.
    ///
    /// `Ok` after a normal exit or any exit following [`terminate`](Self::terminate),
    /// [`VmError::AbnormalExit`] otherwise.
    async fn wait(&mut self) -> Result<(), VmError>;
}

/// Starts VMs.
pub trait Launcher {
    type Handle: VmHandle;

    fn launch(&mut self, stdin: StdinPolicy) -> Result<Self::Handle, VmError>;
}
