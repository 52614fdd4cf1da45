//! engine::publish
//!
//! Stage, commit, push - once, with no retry.
//!
//! The first failing sub-command aborts the whole step and names itself.
//! A push that fails after a successful commit leaves the local commit in
//! place; the next run pushes it along with whatever is new.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::git::GitRunner;

/// Which sub-command of the publish step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Stage,
    Commit,
    Push,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stage => "stage",
            Self::Commit => "commit",
            Self::Push => "push",
        })
    }
}

/// A publish step that did not run to completion.
#[derive(Debug, Error)]
#[error("publish failed at {stage}: {details}")]
pub struct PublishError {
    /// The sub-command that failed
    pub stage: PublishStage,
    /// Exit disposition and captured output
    pub details: String,
}

/// Stage exactly `paths`, commit with `message`, and push to the tracked
/// upstream.
pub async fn commit_and_push(
    git: &GitRunner,
    paths: &[String],
    message: &str,
) -> Result<(), PublishError> {
    // Exact paths, never a wildcard add.
    let mut add_args = vec!["add", "--"];
    add_args.extend(paths.iter().map(String::as_str));
    run_step(git, &add_args, PublishStage::Stage).await?;

    run_step(git, &["commit", "-m", message], PublishStage::Commit).await?;
    run_step(git, &["push"], PublishStage::Push).await?;

    info!(files = paths.len(), %message, "committed and pushed");
    Ok(())
}

async fn run_step(
    git: &GitRunner,
    args: &[&str],
    stage: PublishStage,
) -> Result<(), PublishError> {
    let out = git
        .git(args)
        .await
        .map_err(|err| PublishError {
            stage,
            details: err.to_string(),
        })?;
    if !out.success() {
        return Err(PublishError {
            stage,
            details: out.summary(),
        });
    }
    Ok(())
}
