//! Backing file for the storage peripheral.
//!
//! The file is created once and then reused: each launch only resizes it to
//! the configured size, so whatever the guest wrote is still there after a
//! dev-loop restart. Nothing deletes it on exit.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Create `path` if missing and set its length to `size` bytes.
///
/// Existing contents within `size` are kept; a longer file is truncated, a
/// shorter one is zero-extended.
pub fn ensure_backing_file(path: &Path, size: u64) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;

    if file.metadata()?.len() != size {
        file.set_len(size)?;
    }
    Ok(())
}
