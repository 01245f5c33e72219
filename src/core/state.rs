//! Process-wide shutdown state.
//!
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//! - `SESSION`: Is a VM-supervising session running that must clean up first?

use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// A session owning a VM process is active
static SESSION: AtomicBool = AtomicBool::new(false);

/// Wakes the session waiting in `shutdown_requested()`
static SHUTDOWN_NOTIFY: LazyLock<Notify> = LazyLock::new(Notify::new);

/// Setup the global Ctrl+C handler. Call once at program start
///
/// SIGTERM and SIGHUP are handled the same way as SIGINT.
///
/// The handler behavior depends on whether a session has been registered:
/// - Before `register_session()`: exit immediately (children share our
///   process group and receive the same signal)
/// - After `register_session()`: set SHUTDOWN and wake the session so it can
///   terminate its VM before the host exits
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if SESSION.load(Ordering::SeqCst) {
            crate::log!("dev"; "shutting down...");
            SHUTDOWN_NOTIFY.notify_one();
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register a VM-supervising session for graceful shutdown
pub fn register_session() {
    SESSION.store(true, Ordering::SeqCst);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Resolve once Ctrl+C has been received.
///
/// `notify_one` stores a permit, so a signal that lands between the flag
/// check and the await is not lost.
pub async fn shutdown_requested() {
    if is_shutdown() {
        return;
    }
    SHUTDOWN_NOTIFY.notified().await;
}
