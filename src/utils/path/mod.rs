//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization and atomic writes

pub mod fs;

pub use fs::{normalize_path, resolve_path, write_atomic};
