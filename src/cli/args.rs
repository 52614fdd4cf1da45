//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal stdout output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Repopulse - scheduled low-stakes repository activity
#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if pulse was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal stdout output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands. With no subcommand, `run` is implied.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sync with the remote, mutate tracked files, commit, and push
    Run,

    /// Register randomized one-shot runs across the rest of the day
    Schedule {
        /// Plan and log the schedule without registering any jobs
        #[arg(long)]
        dry_run: bool,
    },
}
