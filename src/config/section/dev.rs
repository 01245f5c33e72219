//! `[dev]` section configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Watch and debounce settings for `ftl dev`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Quiet period before a burst of changes triggers a rebuild.
    pub debounce_ms: u64,
    /// Root-relative prefixes whose changes are ignored (build outputs).
    pub exclude: Vec<PathBuf>,
    /// Extensions (without dot) that count as sources.
    pub extensions: Vec<String>,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 5,
            exclude: vec!["build".into(), "target".into()],
            extensions: ["rs", "toml", "ts", "js", "json", "html"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl DevConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.debounce_ms == 0 {
            errors.push("dev.debounce_ms must be greater than 0".into());
        }
        if self.extensions.is_empty() {
            errors.push("dev.extensions must list at least one extension".into());
        }
    }
}
