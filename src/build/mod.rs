//! Build pipeline: toolchain runs for every artifact, initfs packaging and
//! kernel image placement.
//!
//! Architecture:
//! ```text
//! BuildParams → Toolchain × (apps + kernel) → Archive → initfs.tar
//!                                            └→ kernel → ftl.elf
//! ```

mod archive;
mod coordinator;
mod error;
mod layout;
mod params;
mod toolchain;


pub use archive::Archive;
pub use coordinator::{BuildOutput, build};
pub use error::{ArchiveError, BuildError};
pub use layout::ProjectLayout;
pub use params::BuildParams;
pub use toolchain::{Cargo, Invocation, Toolchain};

use crate::config::ProjectConfig;
use crate::core::BuildMode;

/// Everything needed to repeat a build pass.
#[derive(Debug, Clone)]
pub struct Pipeline<T = Cargo> {
    params: BuildParams,
    layout: ProjectLayout,
    toolchain: T,
}

impl Pipeline<Cargo> {
    /// Pipeline for the configured project with the real toolchain.
    pub fn from_config(config: &ProjectConfig, mode: BuildMode) -> Result<Self, BuildError> {
        let params = BuildParams::new(mode, config.build.arch, config.build.apps.iter().cloned())?;
        Ok(Self::new(
            params,
            ProjectLayout::from_config(config),
            Cargo::new(config.build.cargo.clone()),
        ))
    }
}

impl<T: Toolchain> Pipeline<T> {
    pub fn new(params: BuildParams, layout: ProjectLayout, toolchain: T) -> Self {
        Self {
            params,
            layout,
            toolchain,
        }
    }

    /// Run one full pass.
    pub fn run(&self) -> Result<BuildOutput, BuildError> {
        build(&self.params, &self.layout, &self.toolchain)
    }
}
