//! sched
//!
//! Randomized one-shot scheduling via the OS `at` queue.
//!
//! The scheduler computes up to a configured number of random times in the
//! remainder of the current day and registers one `at` job per time, each
//! job re-invoking this binary's `run` in the repository directory. The
//! scheduler and the engine share no runtime state; coordination happens
//! entirely through wall-clock-triggered process spawns.
//!
//! Per-job registration failures are logged and skipped - a partially
//! registered day is still a day with activity.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::exec;

/// Errors from job registration.
#[derive(Debug, Error)]
pub enum SchedError {
    /// The path of the running executable could not be determined.
    #[error("cannot determine own executable path: {0}")]
    CurrentExe(#[from] std::io::Error),
}

/// Choose 0..=`max_runs` random times between `now` and the end of the
/// current day, sorted ascending.
pub fn plan(now: NaiveDateTime, max_runs: u32, rng: &mut impl Rng) -> Vec<NaiveDateTime> {
    let end_of_day = now
        .date()
        .and_hms_opt(23, 59, 59)
        .unwrap_or(now);
    let window = (end_of_day - now).num_seconds().max(0);

    let runs = rng.random_range(0..=max_runs);
    let mut times: Vec<NaiveDateTime> = (0..runs)
        .map(|_| now + chrono::Duration::seconds(rng.random_range(0..=window)))
        .collect();
    times.sort();
    times
}

/// Register one `at` job per planned time.
///
/// Returns how many registrations succeeded; individual failures are
/// logged, not propagated.
pub async fn register(
    times: &[NaiveDateTime],
    repo: &Path,
    timeout: Duration,
) -> Result<usize, SchedError> {
    let exe = std::env::current_exe()?;
    let job = format!(
        "cd {} && {} run\n",
        sh_quote(&repo.to_string_lossy()),
        sh_quote(&exe.to_string_lossy()),
    );

    let mut registered = 0;
    for time in times {
        let when = time.format("%H:%M").to_string();
        match exec::run_with_stdin("at", &[&when], repo, &job, timeout).await {
            Ok(out) if out.success() => {
                registered += 1;
                info!(time = %when, "registered one-shot run");
            }
            Ok(out) => warn!(time = %when, "at rejected the job: {}", out.summary()),
            Err(err) => warn!(time = %when, error = %err, "could not invoke at"),
        }
    }
    Ok(registered)
}

/// Quote a string for use in a POSIX shell command line.
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
