use rustc_hash::FxHashSet;

use super::BuildError;
use crate::core::{Arch, BuildMode};

/// Name of the privileged artifact, built after every app.
pub const KERNEL_ARTIFACT: &str = "kernel";

/// Immutable description of one build pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    pub mode: BuildMode,
    pub arch: Arch,
    apps: Vec<String>,
}

impl BuildParams {
    /// Build params from an ordered app list.
    ///
    /// Repeated names keep the position of their first occurrence, so every
    /// app is compiled and packaged once.
    pub fn new<I, S>(mode: BuildMode, arch: Arch, apps: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = FxHashSet::default();
        let apps: Vec<String> = apps
            .into_iter()
            .map(Into::into)
            .filter(|app| seen.insert(app.clone()))
            .collect();

        if apps.is_empty() {
            return Err(BuildError::NoApps);
        }

        Ok(Self { mode, arch, apps })
    }

    /// Apps in build order.
    pub fn apps(&self) -> &[String] {
        &self.apps
    }
}
