//! engine::sync
//!
//! The synchronization engine: reconcile the working tree with its remote
//! before anything new is committed.
//!
//! # Protocol
//!
//! Each attempt walks a fixed sequence:
//!
//! 1. **Preconditions** - inside a work tree, identity configured, remote
//!    reachable, HEAD on a branch. Any failure is fatal and never retried;
//!    these are configuration problems, not transient ones.
//! 2. **Protect** - stash uncommitted changes (skipped when a stash from a
//!    failed attempt is still outstanding; never stash twice).
//! 3. **Pull** - rebase-pull the current branch from the remote.
//! 4. **Conflict check** - read porcelain status rather than trusting the
//!    pull's exit code alone; some rebase failures exit non-zero without
//!    leaving markers. Markers mean abort the rebase and fail the attempt.
//! 5. **Restore** - pop the protective stash.
//!
//! Attempt failures feed a bounded retry with a fixed delay. Exhaustion is
//! reported, not raised: the caller decides whether publishing on local
//! state is still worthwhile.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::retry::{Retryable, RetryError, RetryPolicy};
use crate::git::conflict;
use crate::git::stash::{StashError, StashHandle, StashManager};
use crate::git::{GitError, GitRunner, Inspector};

/// Errors from one sync attempt.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration problem; retrying cannot help.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The rebase pull failed without leaving conflict markers.
    #[error("pull failed: {0}")]
    Pull(String),

    /// The rebase stopped on conflicts; it has been aborted.
    #[error("rebase conflict detected")]
    Conflict,

    /// Local changes could not be stashed before the pull.
    #[error("could not protect local changes: {0}")]
    Protect(StashError),

    /// Local changes could not be popped back after the pull.
    #[error("could not restore local changes: {0}")]
    StashRestore(StashError),
}

impl Retryable for SyncError {
    fn is_fatal(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Terminal result of a whole sync run.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The working tree is reconciled with the remote.
    Success,
    /// Every attempt failed; carries the last attempt's error.
    ExhaustedRetries(SyncError),
    /// The repository is misconfigured; nothing was attempted repeatedly.
    FatalPrecondition(String),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Composes inspection, stashing, pulling, and conflict handling into one
/// retried `sync()` operation.
#[derive(Debug)]
pub struct SyncEngine<'a> {
    git: &'a GitRunner,
    remote: String,
    policy: RetryPolicy,
}

impl<'a> SyncEngine<'a> {
    pub fn new(git: &'a GitRunner, remote: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            git,
            remote: remote.into(),
            policy,
        }
    }

    /// Reconcile the working tree with the remote.
    ///
    /// Never returns an error: the outcome says what happened and the
    /// caller chooses how much to care. On any non-success outcome a still
    /// outstanding protective stash is restored best-effort, and left in
    /// the stash list (logged) when even that fails.
    pub async fn sync(&self) -> SyncOutcome {
        let stash = StashManager::new(self.git);
        let result = self
            .policy
            .run(|attempt| self.run_attempt(&stash, attempt))
            .await;

        let outcome = match result {
            Ok(()) => SyncOutcome::Success,
            Err(RetryError::Fatal(SyncError::Precondition(reason))) => {
                SyncOutcome::FatalPrecondition(reason)
            }
            Err(RetryError::Fatal(error)) => SyncOutcome::ExhaustedRetries(error),
            Err(RetryError::Exhausted { attempts, error }) => {
                warn!(attempts, error = %error, "sync retries exhausted");
                SyncOutcome::ExhaustedRetries(error)
            }
        };

        if !outcome.is_success() && stash.outstanding() {
            match stash.restore_outstanding().await {
                Ok(()) => info!("restored stashed local changes after failed sync"),
                Err(err) => {
                    warn!(error = %err, "local changes remain stashed; run `git stash pop` to recover them")
                }
            }
        }

        outcome
    }

    async fn run_attempt(
        &self,
        stash: &StashManager<'_>,
        attempt: u32,
    ) -> Result<(), SyncError> {
        debug!(attempt, remote = %self.remote, "sync attempt starting");
        let inspect = Inspector::new(self.git);

        // Preconditions. All read-only; nothing below runs unless they pass.
        let fatal = |err: GitError| SyncError::Precondition(err.to_string());
        if !inspect.is_repository().await.map_err(fatal)? {
            return Err(SyncError::Precondition(
                "not inside a git work tree".to_string(),
            ));
        }
        if !inspect.identity_configured().await.map_err(fatal)? {
            return Err(SyncError::Precondition(
                "user.name and user.email are not both configured".to_string(),
            ));
        }
        if !inspect.remote_reachable(&self.remote).await.map_err(fatal)? {
            return Err(SyncError::Precondition(format!(
                "remote `{}` is not reachable",
                self.remote
            )));
        }
        let branch = inspect.current_branch().await.map_err(fatal)?;

        // Protect. A stash left over from a failed attempt is reused, not
        // stacked.
        let handle = if stash.outstanding() {
            debug!("reusing protective stash from a previous attempt");
            StashHandle::carried_over()
        } else {
            stash.protect().await.map_err(SyncError::Protect)?
        };

        // Pull.
        let pull = self
            .git
            .git(&["pull", "--rebase", &self.remote, &branch])
            .await
            .map_err(|err| SyncError::Pull(err.to_string()))?;

        // Conflict check, from status rather than the exit code alone.
        let status = inspect
            .status_porcelain()
            .await
            .map_err(|err| SyncError::Pull(err.to_string()))?;
        if conflict::has_conflicts(&status) {
            warn!(attempt, "rebase conflict detected, aborting rebase");
            conflict::abort_rebase(self.git).await;
            return Err(SyncError::Conflict);
        }
        if !pull.success() {
            return Err(SyncError::Pull(pull.summary()));
        }

        // Restore.
        stash.restore(&handle).await.map_err(SyncError::StashRestore)?;

        info!(attempt, branch = %branch, "synchronized with remote");
        Ok(())
    }
}
