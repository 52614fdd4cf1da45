//! cli
//!
//! Command-line interface layer for Repopulse.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialize the process-wide logger (once, at startup)
//! - Load configuration and build the execution context
//! - Delegate to command handlers
//!
//! The CLI layer is thin. All repository interaction happens in
//! [`crate::engine`] and the modules underneath it.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::engine::Context;

/// Environment variable overriding the log file location.
const LOG_FILE_ENV: &str = "PULSE_LOG";

/// Default log location inside the repository's git directory. Keeping the
/// log out of the working tree matters: a log file next to the tracked
/// files would dirty the tree on every run and end up inside the
/// protective stash.
const LOG_FILE_DEFAULT: &str = ".git/pulse/log";

/// Fallback log file name when there is no git directory to hide it in.
const LOG_FILE_FALLBACK: &str = "pulse.log";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let cwd = match cli.cwd.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    // The logger must exist before anything can fail, since failures are
    // reported through it rather than through the exit status.
    init_logging(&cwd, cli.debug);
    info!(version = env!("CARGO_PKG_VERSION"), cwd = %cwd.display(), "pulse starting");

    let config = Config::load(&cwd)?;
    let ctx = Context {
        cwd,
        quiet: cli.quiet,
        config,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Initialize the process-wide tracing subscriber.
///
/// Events append to the log file; if it cannot be opened, they fall back
/// to stderr so nothing is lost silently.
fn init_logging(cwd: &Path, debug: bool) {
    // The binary crate logs under `pulse`, the library under `repopulse`.
    let level = if debug { "debug" } else { "info" };
    let directive = format!("repopulse={level},pulse={level}");
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive))
    };

    let path = log_file_path(cwd);
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
        }
    }
}

fn log_file_path(cwd: &Path) -> PathBuf {
    if let Some(path) = std::env::var_os(LOG_FILE_ENV) {
        return PathBuf::from(path);
    }
    if cwd.join(".git").is_dir() {
        let path = cwd.join(LOG_FILE_DEFAULT);
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        return path;
    }
    cwd.join(LOG_FILE_FALLBACK)
}
