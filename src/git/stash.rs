//! git::stash
//!
//! Protective stashing of uncommitted changes around a pull.
//!
//! # Invariants
//!
//! - At most one protective stash is outstanding per manager; a second
//!   `protect()` while the first is unresolved is refused rather than
//!   stacking entries
//! - A created stash is either restored or left in the stash list - it is
//!   never silently dropped. When a pop fails, one fallback `apply` keeps
//!   the entry recoverable and the failure is surfaced distinctly so the
//!   caller knows manual resolution differs from a plain pull failure

use std::cell::Cell;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{GitError, GitRunner, Inspector};

/// Errors from stash operations.
#[derive(Debug, Error)]
pub enum StashError {
    /// A protective stash from a previous attempt is still unresolved.
    #[error("a protective stash is already outstanding")]
    AlreadyProtected,

    /// The stash entry could not be created.
    #[error("failed to stash local changes: {details}")]
    CreateFailed {
        /// Exit disposition and captured output
        details: String,
    },

    /// The stash entry could not be popped back onto the working tree.
    ///
    /// The entry is still in the stash list either way; `reapplied` records
    /// whether the fallback `apply` managed to put the changes back.
    #[error("failed to restore stashed changes: {details} (entry kept in stash list, reapplied: {reapplied})")]
    RestoreFailed {
        /// Exit disposition and captured output of the failed pop
        details: String,
        /// Whether the fallback apply succeeded
        reapplied: bool,
    },

    /// An underlying git invocation failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Whether `protect()` actually created a stash entry.
#[derive(Debug, Clone, Copy)]
pub struct StashHandle {
    /// True iff a stash entry was created and must be resolved.
    pub created: bool,
}

impl StashHandle {
    /// Handle for a stash created by a previous attempt and still
    /// outstanding; restoring it behaves exactly like restoring the
    /// original handle.
    pub fn carried_over() -> Self {
        Self { created: true }
    }
}

/// Wraps uncommitted changes into a stash before a pull and restores them
/// after.
#[derive(Debug)]
pub struct StashManager<'a> {
    git: &'a GitRunner,
    outstanding: Cell<bool>,
}

impl<'a> StashManager<'a> {
    pub fn new(git: &'a GitRunner) -> Self {
        Self {
            git,
            outstanding: Cell::new(false),
        }
    }

    /// True iff a created stash has not been resolved yet.
    pub fn outstanding(&self) -> bool {
        self.outstanding.get()
    }

    /// Stash uncommitted changes, if there are any.
    ///
    /// A clean tree performs no git operation at all and returns
    /// `created: false` - stashing with nothing to stash must not fabricate
    /// a spurious entry.
    ///
    /// # Errors
    ///
    /// [`StashError::AlreadyProtected`] if a prior stash is unresolved.
    pub async fn protect(&self) -> Result<StashHandle, StashError> {
        if self.outstanding.get() {
            return Err(StashError::AlreadyProtected);
        }
        if !Inspector::new(self.git).is_dirty().await? {
            debug!("working tree clean, nothing to protect");
            return Ok(StashHandle { created: false });
        }

        let label = format!("pulse-{}", Uuid::new_v4());
        let out = self
            .git
            .git(&["stash", "push", "--include-untracked", "-m", &label])
            .await?;
        if !out.success() {
            return Err(StashError::CreateFailed {
                details: out.summary(),
            });
        }
        self.outstanding.set(true);
        info!(%label, "stashed local changes");
        Ok(StashHandle { created: true })
    }

    /// Pop the protective stash back onto the working tree.
    ///
    /// No-op for a handle that never created an entry. When the pop fails
    /// (typically because the pull brought in a conflicting change), one
    /// fallback `apply` keeps the entry in the stash list before the
    /// failure is re-raised.
    pub async fn restore(&self, handle: &StashHandle) -> Result<(), StashError> {
        if !handle.created {
            return Ok(());
        }

        let pop = self.git.git(&["stash", "pop"]).await?;
        if pop.success() {
            self.outstanding.set(false);
            info!("restored stashed local changes");
            return Ok(());
        }

        // A failed pop leaves the entry in place; try to at least get the
        // changes back into the tree without dropping the entry.
        let apply = self.git.git(&["stash", "apply"]).await?;
        let reapplied = apply.success();
        if reapplied {
            self.outstanding.set(false);
            warn!("stash pop failed but apply succeeded; entry kept as a backup");
        } else {
            warn!("stash pop and fallback apply both failed; entry kept for manual recovery");
        }
        Err(StashError::RestoreFailed {
            details: pop.summary(),
            reapplied,
        })
    }

    /// Restore whatever stash is still outstanding, if any.
    pub async fn restore_outstanding(&self) -> Result<(), StashError> {
        if !self.outstanding.get() {
            return Ok(());
        }
        self.restore(&StashHandle::carried_over()).await
    }
}
