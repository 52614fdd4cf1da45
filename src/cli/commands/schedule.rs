//! cli::commands::schedule
//!
//! Plan the day's randomized runs and hand them to the `at` queue.

use anyhow::Result;
use chrono::Local;
use tracing::info;

use crate::engine::Context;
use crate::sched;

/// Run the schedule command.
///
/// This is a synchronous wrapper that uses tokio to run the async
/// implementation.
pub fn schedule(ctx: &Context, dry_run: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(schedule_async(ctx, dry_run))
}

async fn schedule_async(ctx: &Context, dry_run: bool) -> Result<()> {
    let mut rng = rand::rng();
    let now = Local::now().naive_local();
    let times = sched::plan(now, ctx.config.schedule.max_daily_runs, &mut rng);

    info!(runs = times.len(), "planned runs for the rest of today");
    for time in &times {
        info!("run planned for {}", time.format("%H:%M:%S"));
    }

    if dry_run {
        if !ctx.quiet {
            println!("Planned {} run(s) (dry run, nothing registered)", times.len());
        }
        return Ok(());
    }

    let registered = sched::register(&times, &ctx.cwd, ctx.config.command_timeout()).await?;
    if !ctx.quiet {
        println!("Registered {registered} of {} run(s)", times.len());
    }
    Ok(())
}
