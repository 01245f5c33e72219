//! `ftl dev`: watch, rebuild and relaunch.

use anyhow::Result;

use super::runtime;
use crate::build::Pipeline;
use crate::config::ProjectConfig;
use crate::core::{BuildMode, register_session, shutdown_requested};
use crate::dev::{Orchestrator, Session};
use crate::vm::Qemu;
use crate::watch::{ChangeWatcher, Debouncer, WatchFilter};

/// Run the dev loop until Ctrl+C.
///
/// Build and VM failures are reported and the loop keeps watching; only a
/// broken watcher ends the session early.
pub fn dev_project(config: &ProjectConfig, mode: BuildMode) -> Result<()> {
    let pipeline = Pipeline::from_config(config, mode)?;
    let launcher = Qemu::from_config(config);
    let filter = WatchFilter::from_config(config);

    let rt = runtime()?;
    rt.block_on(async {
        register_session();

        // Watch before the first build so edits made during it are not lost.
        let watcher = ChangeWatcher::start(filter.root())?;
        let session = Session::new(
            Orchestrator::new(pipeline, launcher),
            watcher,
            Debouncer::new(filter, config.dev.debounce()),
        );

        session.run(shutdown_requested()).await?;
        Ok(())
    })
}
