//! ftl - build, package and live-reload the ftl kernel and its apps.

mod build;
mod cli;
mod config;
mod core;
mod dev;
mod logger;
mod utils;
mod vm;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;
use core::BuildMode;

fn main() {
    if let Err(err) = run() {
        log!("error"; "{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = ProjectConfig::load(&cli)?;
    let mode = BuildMode::from_env();
    if let Some(path) = &config.config_path {
        debug!("config"; "loaded {}", path.display());
    }
    debug!("config"; "root {}, {} mode", config.root.display(), mode);

    match cli.command {
        Commands::Build => cli::build::build_project(&config, mode).map(|_| ()),
        Commands::Run => cli::run::run_project(&config, mode),
        Commands::Dev => cli::dev::dev_project(&config, mode),
    }
}
