//! `ftl build`: one build pass.

use anyhow::Result;

use crate::build::{BuildOutput, Pipeline};
use crate::config::ProjectConfig;
use crate::core::BuildMode;
use crate::log;

/// Build every artifact and write the initfs and kernel image.
pub fn build_project(config: &ProjectConfig, mode: BuildMode) -> Result<BuildOutput> {
    let pipeline = Pipeline::from_config(config, mode)?;
    let output = pipeline.run()?;

    log!(
        "build";
        "packaged {} app(s) into {}, kernel at {}",
        output.artifacts.len(),
        display_relative(config, &output.initfs),
        display_relative(config, &output.kernel_image),
    );
    Ok(output)
}

fn display_relative(config: &ProjectConfig, path: &std::path::Path) -> String {
    path.strip_prefix(&config.root)
        .unwrap_or(path)
        .display()
        .to_string()
}
