//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG;

/// Build, package and live-reload the ftl kernel and its apps under QEMU
#[derive(Parser, Debug, Clone)]
#[command(name = "ftl", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: ftl.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
///
/// Release builds are selected with `FTL_RELEASE=1`.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Build every app and the kernel, then package the initfs
    #[command(visible_alias = "b")]
    Build,

    /// Build, then boot the VM in the foreground
    #[command(visible_alias = "r")]
    Run,

    /// Build and boot, then rebuild and reboot on every source change
    #[command(visible_alias = "d")]
    Dev,
}
