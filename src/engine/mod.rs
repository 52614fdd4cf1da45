//! engine
//!
//! Orchestrates the run lifecycle: Sync -> Mutate -> Publish.
//!
//! # Architecture
//!
//! The engine owns the only control flow in the tool that has failure
//! branches worth reasoning about:
//!
//! 1. **Sync** ([`sync`]): reconcile the working tree with the remote -
//!    precondition checks, stash-protected rebase pull, conflict
//!    detection/abort - wrapped in a bounded retry ([`retry`])
//! 2. **Publish** ([`publish`]): stage, commit, push - once, no retry
//!
//! Mutation of files sits between the two and lives in [`crate::activity`];
//! it consumes nothing from the engine.
//!
//! # Invariants
//!
//! - Precondition failures surface immediately and never consume retry
//!   budget
//! - Sync exhaustion is non-fatal: the caller may still publish on local
//!   state
//! - Publish failures are terminal for the run and name the failing stage

pub mod publish;
pub mod retry;
pub mod sync;

pub use publish::{commit_and_push, PublishError, PublishStage};
pub use retry::{RetryError, RetryPolicy, Retryable};
pub use sync::{SyncEngine, SyncError, SyncOutcome};

use std::path::PathBuf;

use crate::core::config::Config;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags plus the loaded
/// configuration.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved working directory (the repository root commands act on).
    pub cwd: PathBuf,
    /// Quiet mode (minimal stdout output).
    pub quiet: bool,
    /// Loaded configuration.
    pub config: Config,
}
