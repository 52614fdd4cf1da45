//! git
//!
//! Single doorway for all git operations.
//!
//! # Architecture
//!
//! All git interactions flow through [`GitRunner`], which binds a working
//! directory and a per-command timeout and shells out via [`crate::exec`].
//! No other module invokes git directly. This keeps error handling uniform
//! and makes every git interaction visible in one place:
//!
//! - [`inspect`] - side-effect-free predicates over repository state
//! - [`conflict`] - unmerged-path detection and best-effort rebase abort
//! - [`stash`] - protective stashing of uncommitted changes
//!
//! # Invariants
//!
//! - Repository state is never cached across commands; each predicate in
//!   [`inspect`] re-runs git, because any mutating command may invalidate
//!   what a previous check observed
//! - Inspection commands are read-only

pub mod conflict;
pub mod inspect;
pub mod stash;

pub use inspect::Inspector;
pub use stash::{StashHandle, StashManager};

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::exec::{self, CommandOutput, ExecError};

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary itself could not be run.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// HEAD does not point at a branch.
    #[error("HEAD is not on a branch")]
    DetachedHead,

    /// A git command that must succeed did not.
    #[error("git {action} failed: {details}")]
    CommandFailed {
        /// Which operation was being performed
        action: &'static str,
        /// Exit disposition and captured output
        details: String,
    },
}

/// Runs git commands in one repository with one timeout.
#[derive(Debug, Clone)]
pub struct GitRunner {
    cwd: PathBuf,
    timeout: Duration,
}

impl GitRunner {
    /// Create a runner for the repository at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            cwd: cwd.into(),
            timeout,
        }
    }

    /// The working directory commands run in.
    pub fn workdir(&self) -> &Path {
        &self.cwd
    }

    /// Run `git <args>` and capture the result.
    pub async fn git(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = exec::run("git", args, &self.cwd, self.timeout).await?;
        Ok(output)
    }
}
