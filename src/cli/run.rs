//! `ftl run`: build once, then boot the VM in the foreground.

use anyhow::{Context, Result};

use super::build::build_project;
use super::runtime;
use crate::config::ProjectConfig;
use crate::core::{BuildMode, register_session, shutdown_requested};
use crate::dev::SHUTDOWN_GRACE;
use crate::utils::exec::StdinPolicy;
use crate::vm::{Launcher, Qemu, VmHandle};
use crate::log;

/// Build, boot with the terminal attached, and return when the VM exits.
///
/// A VM exit that was not requested with Ctrl+C and was not clean is an
/// error.
pub fn run_project(config: &ProjectConfig, mode: BuildMode) -> Result<()> {
    build_project(config, mode)?;

    let rt = runtime()?;
    rt.block_on(async {
        register_session();

        let mut vm = Qemu::from_config(config).launch(StdinPolicy::Inherit)?;

        tokio::select! {
            exit = vm.wait() => exit.context("VM failed"),
            () = shutdown_requested() => {
                vm.terminate()?;
                match tokio::time::timeout(SHUTDOWN_GRACE, vm.wait()).await {
                    Ok(exit) => exit?,
                    Err(_) => log!("vm"; "VM did not exit within {}s", SHUTDOWN_GRACE.as_secs()),
                }
                Ok(())
            }
        }
    })
}
