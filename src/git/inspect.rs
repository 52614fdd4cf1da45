//! git::inspect
//!
//! Side-effect-free predicates over repository state.
//!
//! Each predicate is one git invocation, idempotent and read-only. Results
//! are deliberately not cached: git state can change between checks, so no
//! caller may assume an answer remains valid after a mutating command runs.

use super::{GitError, GitRunner};

/// Read-only questions about a working tree.
#[derive(Debug, Clone, Copy)]
pub struct Inspector<'a> {
    git: &'a GitRunner,
}

impl<'a> Inspector<'a> {
    pub fn new(git: &'a GitRunner) -> Self {
        Self { git }
    }

    /// True iff the working directory is inside a git work tree.
    pub async fn is_repository(&self) -> Result<bool, GitError> {
        let out = self.git.git(&["rev-parse", "--is-inside-work-tree"]).await?;
        Ok(out.success() && out.stdout.trim() == "true")
    }

    /// True iff both `user.name` and `user.email` resolve in any scope.
    pub async fn identity_configured(&self) -> Result<bool, GitError> {
        for key in ["user.name", "user.email"] {
            let out = self.git.git(&["config", key]).await?;
            if !out.success() || out.stdout.trim().is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True iff the remote's refs can be listed (network/auth probe).
    pub async fn remote_reachable(&self, remote: &str) -> Result<bool, GitError> {
        let out = self.git.git(&["ls-remote", "--heads", remote]).await?;
        Ok(out.success())
    }

    /// Short name of the branch HEAD points at.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::DetachedHead`] when HEAD is not a branch.
    pub async fn current_branch(&self) -> Result<String, GitError> {
        let out = self.git.git(&["symbolic-ref", "--short", "-q", "HEAD"]).await?;
        let branch = out.stdout.trim();
        if !out.success() || branch.is_empty() {
            return Err(GitError::DetachedHead);
        }
        Ok(branch.to_string())
    }

    /// True iff there are uncommitted or untracked changes.
    pub async fn is_dirty(&self) -> Result<bool, GitError> {
        Ok(!self.status_porcelain().await?.trim().is_empty())
    }

    /// Raw `git status --porcelain` output, including untracked entries.
    pub async fn status_porcelain(&self) -> Result<String, GitError> {
        let out = self.git.git(&["status", "--porcelain"]).await?;
        if !out.success() {
            return Err(GitError::CommandFailed {
                action: "status",
                details: out.summary(),
            });
        }
        Ok(out.stdout)
    }
}
