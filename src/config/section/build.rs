//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! apps = ["virtio_net", "tcpip", "http_server"]
//! arch = "x64"
//! initfs = "initfs.tar"
//! kernel_image = "ftl.elf"
//! ```

use crate::core::Arch;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to build and where the results go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// User apps packed into the initfs, built in this order.
    pub apps: Vec<String>,
    /// Target architecture.
    pub arch: Arch,
    /// Toolchain driver program.
    pub cargo: String,
    /// Directory holding one crate per app (`<apps_dir>/<app>/Cargo.toml`).
    pub apps_dir: PathBuf,
    /// Kernel crate directory.
    pub kernel_dir: PathBuf,
    /// Directory holding `<arch>/user.json` target descriptors.
    pub user_target_dir: PathBuf,
    /// Cargo target directory.
    pub target_dir: PathBuf,
    /// Package file handed to the VM as its initrd.
    pub initfs: PathBuf,
    /// Final kernel image location.
    pub kernel_image: PathBuf,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            apps: vec!["virtio_net".into(), "tcpip".into(), "http_server".into()],
            arch: Arch::default(),
            cargo: "cargo".into(),
            apps_dir: "apps".into(),
            kernel_dir: "kernel".into(),
            user_target_dir: "libs/rust/ftl/src/arch".into(),
            target_dir: "target".into(),
            initfs: "initfs.tar".into(),
            kernel_image: "ftl.elf".into(),
        }
    }
}

impl BuildSectionConfig {
    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.apps.is_empty() {
            errors.push("build.apps must list at least one app".into());
        }
        if let Some(app) = self.apps.iter().find(|app| app.trim().is_empty()) {
            errors.push(format!("build.apps contains an empty name: {app:?}"));
        }
        if self.cargo.trim().is_empty() {
            errors.push("build.cargo must not be empty".into());
        }
    }
}
