//! Which changes count as source edits.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::ProjectConfig;
use crate::utils::path::normalize_path;

/// Accepts changes to source files under the watch root.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    root: PathBuf,
    excluded: Vec<PathBuf>,
    extensions: FxHashSet<String>,
}

impl WatchFilter {
    pub fn new<I, S>(root: &Path, excluded: Vec<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: normalize_path(root),
            excluded,
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(
            &config.root,
            config.dev.exclude.clone(),
            config.dev.extensions.iter().cloned(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Is a change to `path` a qualifying source edit?
    pub fn accepts(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);

        // Component-wise: `build` excludes `build/x` but not `builder/x`.
        if self.excluded.iter().any(|prefix| relative.starts_with(prefix)) {
            return false;
        }
        if is_temp_file(path) {
            return false;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(ext))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
