//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler builds a tokio runtime, blocks on the async
//! implementation, and keeps stdout minimal; the log file carries the
//! detail.

mod run;
mod schedule;

pub use run::run;
pub use schedule::schedule;

use anyhow::Result;

use crate::cli::args::Command;
use crate::engine::Context;

/// Dispatch a command to its handler.
///
/// No subcommand means `run`: the scheduled invocations are plain
/// zero-argument calls of the binary.
pub fn dispatch(command: Option<Command>, ctx: &Context) -> Result<()> {
    match command.unwrap_or(Command::Run) {
        Command::Run => run::run(ctx),
        Command::Schedule { dry_run } => schedule::schedule(ctx, dry_run),
    }
}
