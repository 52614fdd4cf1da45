//! cli::commands::run
//!
//! The zero-argument run: sync, mutate, publish.
//!
//! # Design
//!
//! The three phases are deliberately unequal:
//! - Sync failures short of misconfiguration are non-fatal; the run
//!   continues on whatever local state exists and the log records why
//! - A misconfigured repository skips publishing entirely - committing
//!   into a broken setup helps nobody
//! - Publish runs once, with no retry

use anyhow::Result;
use tracing::{error, info, warn};

use crate::activity::{self, messages};
use crate::engine::{publish, Context, RetryPolicy, SyncEngine, SyncOutcome};
use crate::git::GitRunner;

/// Run the run command.
///
/// This is a synchronous wrapper that uses tokio to run the async
/// implementation.
pub fn run(ctx: &Context) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(ctx))
}

async fn run_async(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let git = GitRunner::new(ctx.cwd.clone(), config.command_timeout());
    let policy = RetryPolicy::new(config.sync.max_attempts, config.retry_delay());
    let engine = SyncEngine::new(&git, config.sync.remote.clone(), policy);

    match engine.sync().await {
        SyncOutcome::Success => {}
        SyncOutcome::ExhaustedRetries(err) => {
            warn!(error = %err, "sync failed; publishing on local state");
        }
        SyncOutcome::FatalPrecondition(reason) => {
            error!(%reason, "repository is misconfigured; nothing will be published");
            if !ctx.quiet {
                println!("Skipped: {reason}");
            }
            return Ok(());
        }
    }

    let mut rng = rand::rng();
    let files = activity::update_files(&ctx.cwd, &config.activity.file_prefix, &mut rng)?;
    let pool = ctx.cwd.join(&config.activity.messages_file);
    let message = messages::random_message(&pool, &mut rng)?;

    publish::commit_and_push(&git, &files, &message).await?;
    info!(files = files.len(), "run complete");
    if !ctx.quiet {
        println!("Published {} file(s): {message}", files.len());
    }
    Ok(())
}
