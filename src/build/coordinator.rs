//! Multi-target build pass.
//!
//! Pipeline: apps (in order) -> kernel -> pack initfs -> copy kernel image
//!
//! Every step is fail-fast: the first failing toolchain run ends the pass
//! and nothing is written.

use std::fs;
use std::path::PathBuf;

use super::{Archive, BuildError, BuildParams, Invocation, ProjectLayout, Toolchain};
use crate::{debug, log};

/// Files produced by a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// App name → compiled binary, in build order.
    pub artifacts: Vec<(String, PathBuf)>,
    /// Written package.
    pub initfs: PathBuf,
    /// Copied kernel image.
    pub kernel_image: PathBuf,
}

/// Build every app, then the kernel, then persist the package and image.
pub fn build<T>(
    params: &BuildParams,
    layout: &ProjectLayout,
    toolchain: &T,
) -> Result<BuildOutput, BuildError>
where
    T: Toolchain + ?Sized,
{
    let mut artifacts = Vec::with_capacity(params.apps().len());
    for app in params.apps() {
        let invocation = Invocation::app(layout, params, app);
        log!("build"; "{} ({}, {})", app, params.arch, params.mode);
        toolchain.compile(&invocation)?;
        artifacts.push((invocation.artifact, invocation.output));
    }

    let kernel = Invocation::kernel(layout, params);
    log!("build"; "{} ({}, {})", kernel.artifact, params.arch, params.mode);
    toolchain.compile(&kernel)?;

    let archive =
        Archive::from_files(artifacts.iter().map(|(name, path)| (name.as_str(), path.as_path())))?;
    archive.write_atomic(&layout.initfs)?;
    debug!("build"; "wrote {} ({} entries)", layout.initfs.display(), archive.len());

    if let Some(parent) = layout.kernel_image.parent() {
        fs::create_dir_all(parent).map_err(|source| copy_error(&kernel.output, layout, source))?;
    }
    fs::copy(&kernel.output, &layout.kernel_image)
        .map_err(|source| copy_error(&kernel.output, layout, source))?;

    Ok(BuildOutput {
        artifacts,
        initfs: layout.initfs.clone(),
        kernel_image: layout.kernel_image.clone(),
    })
}

fn copy_error(from: &std::path::Path, layout: &ProjectLayout, source: std::io::Error) -> BuildError {
    BuildError::Copy {
        from: from.to_path_buf(),
        to: layout.kernel_image.clone(),
        source,
    }
}
