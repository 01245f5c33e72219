//! Where manifests, target descriptors and build outputs live.

use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::core::{Arch, BuildMode};

/// Absolute project paths derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub apps_dir: PathBuf,
    pub kernel_dir: PathBuf,
    pub user_target_dir: PathBuf,
    pub target_dir: PathBuf,
    /// Package file written after a successful pass.
    pub initfs: PathBuf,
    /// Copy of the kernel output loaded directly by the VM.
    pub kernel_image: PathBuf,
}

impl ProjectLayout {
    pub fn from_config(config: &ProjectConfig) -> Self {
        let build = &config.build;
        Self {
            root: config.root.clone(),
            apps_dir: config.root_join(&build.apps_dir),
            kernel_dir: config.root_join(&build.kernel_dir),
            user_target_dir: config.root_join(&build.user_target_dir),
            target_dir: config.root_join(&build.target_dir),
            initfs: config.root_join(&build.initfs),
            kernel_image: config.root_join(&build.kernel_image),
        }
    }

    /// Standard layout under `root` with default names.
    #[cfg(test)]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let config = ProjectConfig {
            root: root.into(),
            ..Default::default()
        };
        Self::from_config(&config)
    }

    pub fn app_manifest(&self, app: &str) -> PathBuf {
        self.apps_dir.join(app).join("Cargo.toml")
    }

    pub fn user_target(&self, arch: Arch) -> PathBuf {
        self.user_target_dir.join(arch.as_str()).join("user.json")
    }

    pub fn kernel_manifest(&self) -> PathBuf {
        self.kernel_dir.join("Cargo.toml")
    }

    pub fn kernel_target(&self, arch: Arch) -> PathBuf {
        self.kernel_dir
            .join("src")
            .join("arch")
            .join(arch.as_str())
            .join("kernel.json")
    }

    /// Binary produced for `binary` when building against a custom target
    /// descriptor: `<target_dir>/<descriptor stem>/<mode>/<binary>`.
    pub fn output_path(&self, target: &Path, mode: BuildMode, binary: &str) -> PathBuf {
        let triple = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.target_dir.join(triple).join(mode.as_str()).join(binary)
    }
}
