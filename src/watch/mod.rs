//! Change watcher for `ftl dev`.
//!
//! Architecture:
//! ```text
//! notify (own thread) → unbounded channel → ChangeWatcher → Debouncer → cycle
//! ```
//!
//! The watcher starts before the first build, so edits made while it runs
//! are buffered instead of lost.

mod debouncer;
mod filter;
pub mod types;

#[cfg(test)]
mod tests;

pub use debouncer::Debouncer;
pub use filter::WatchFilter;
pub use types::ChangeEvent;

use std::collections::VecDeque;
use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::debug;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("file watcher failed")]
    Notify(#[from] notify::Error),

    #[error("file watcher stopped delivering events")]
    Closed,
}

/// Source of file changes for the dev loop.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Next change. Cancel-safe: a dropped call loses no event.
    async fn next_event(&mut self) -> Result<ChangeEvent, WatchError>;
}

/// Recursive watcher over the project root.
pub struct ChangeWatcher {
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
    /// Changes from an already received notify event
    pending: VecDeque<ChangeEvent>,
}

impl ChangeWatcher {
    /// Start watching `root` recursively.
    pub fn start(root: &Path) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        debug!("watch"; "watching {}", root.display());

        Ok(Self {
            _watcher: watcher,
            rx,
            pending: VecDeque::new(),
        })
    }
}

impl EventSource for ChangeWatcher {
    async fn next_event(&mut self) -> Result<ChangeEvent, WatchError> {
        loop {
            if let Some(change) = self.pending.pop_front() {
                return Ok(change);
            }
            match self.rx.recv().await {
                Some(Ok(event)) => self.pending.extend(ChangeEvent::from_notify(&event)),
                Some(Err(err)) => return Err(err.into()),
                None => return Err(WatchError::Closed),
            }
        }
    }
}
