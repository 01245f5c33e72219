//! Command-line interface module.

mod args;
pub mod build;
pub mod dev;
pub mod run;

pub use args::{Cli, Commands};

use anyhow::{Context, Result};

/// Single-threaded runtime for the VM-supervising commands.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")
}
