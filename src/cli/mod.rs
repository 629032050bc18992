//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod table;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use tracing::Level;

/// Install the stderr log subscriber for this process
///
/// Warnings are shown by default, `--verbose` adds debug detail and
/// `--quiet` keeps only errors.
pub fn init_logging(global: &GlobalOpts) {
    let level = if global.verbose {
        Level::DEBUG
    } else if global.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
