//! Quiet-period debouncer.
//!
//! ```text
//!          qualifying event              qualifying event (re-arm)
//!  Idle ─────────────────────▶ PendingQuiet ◀──────┐
//!   ▲                              │  └────────────┘
//!   └──────── deadline passed ─────┘  fire(path)
//! ```
//!
//! Pure timing: callers pass the current instant, so tests drive it with
//! a paused clock.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use super::{ChangeEvent, WatchFilter};
use crate::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// Waiting for `deadline` to pass without another qualifying event.
    PendingQuiet { deadline: Instant, path: PathBuf },
}

/// Collapses a burst of qualifying changes into one trigger.
#[derive(Debug)]
pub struct Debouncer {
    filter: WatchFilter,
    window: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(filter: WatchFilter, window: Duration) -> Self {
        Self {
            filter,
            window,
            state: DebounceState::Idle,
        }
    }

    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    #[cfg(test)]
    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.state == DebounceState::Idle
    }

    /// Feed one change. Returns whether it qualified and (re-)armed the
    /// deadline; non-qualifying changes leave the state untouched.
    pub fn on_event(&mut self, event: &ChangeEvent, now: Instant) -> bool {
        if !self.filter.accepts(&event.path) {
            return false;
        }

        debug!("watch"; "{}: {}", event.kind.label(), event.path.display());
        self.state = DebounceState::PendingQuiet {
            deadline: now + self.window,
            path: event.path.clone(),
        };
        true
    }

    /// When the pending trigger is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Idle => None,
            DebounceState::PendingQuiet { deadline, .. } => Some(*deadline),
        }
    }

    /// Path of the pending trigger, if any.
    #[cfg(test)]
    pub fn pending_path(&self) -> Option<&std::path::Path> {
        match &self.state {
            DebounceState::Idle => None,
            DebounceState::PendingQuiet { path, .. } => Some(path),
        }
    }

    /// Return to `Idle` and yield the most recent path once the deadline
    /// has passed.
    pub fn fire(&mut self, now: Instant) -> Option<PathBuf> {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                match std::mem::replace(&mut self.state, DebounceState::Idle) {
                    DebounceState::PendingQuiet { path, .. } => Some(path),
                    DebounceState::Idle => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::watch::types::ChangeKind;

    const WINDOW: Duration = Duration::from_millis(5);

    fn debouncer() -> Debouncer {
        let filter = WatchFilter::new(
            Path::new("/nonexistent-ftl-root"),
            vec!["target".into()],
            ["rs", "toml"],
        );
        Debouncer::new(filter, WINDOW)
    }

    fn change(path: &str) -> ChangeEvent {
        ChangeEvent::new(
            Path::new("/nonexistent-ftl-root").join(path),
            ChangeKind::Modified,
        )
    }

    #[test]
    fn test_arms_on_qualifying_event() {
        let mut d = debouncer();
        let now = Instant::now();

        assert!(d.on_event(&change("kernel/main.rs"), now));
        assert_eq!(d.deadline(), Some(now + WINDOW));
        assert!(!d.is_idle());
    }

    #[test]
    fn test_ignores_non_qualifying_event() {
        let mut d = debouncer();
        let now = Instant::now();

        assert!(!d.on_event(&change("target/out.rs"), now));
        assert!(!d.on_event(&change("notes.md"), now));
        assert!(d.is_idle());

        d.on_event(&change("a.rs"), now);
        let armed = d.state().clone();
        d.on_event(&change("target/out.rs"), now + Duration::from_millis(3));
        assert_eq!(d.state(), &armed);
    }

    #[test]
    fn test_rearm_extends_deadline_and_keeps_latest_path() {
        let mut d = debouncer();
        let t0 = Instant::now();

        d.on_event(&change("a.rs"), t0);
        d.on_event(&change("b.toml"), t0 + Duration::from_millis(3));

        assert_eq!(d.fire(t0 + WINDOW), None);
        assert_eq!(
            d.fire(t0 + Duration::from_millis(8)),
            Some(PathBuf::from("/nonexistent-ftl-root/b.toml"))
        );
        assert!(d.is_idle());
    }

    #[test]
    fn test_fires_once() {
        let mut d = debouncer();
        let t0 = Instant::now();

        d.on_event(&change("a.rs"), t0);
        assert!(d.fire(t0 + WINDOW).is_some());
        assert_eq!(d.fire(t0 + WINDOW * 10), None);
    }

    #[test]
    fn test_fire_before_deadline_is_noop() {
        let mut d = debouncer();
        let t0 = Instant::now();

        assert_eq!(d.fire(t0), None);
        d.on_event(&change("a.rs"), t0);
        assert_eq!(d.fire(t0 + Duration::from_millis(4)), None);
        assert_eq!(d.pending_path(), Some(Path::new("/nonexistent-ftl-root/a.rs")));
    }
}
