//! exec
//!
//! Bounded external command execution.
//!
//! # Contract
//!
//! Every external command this tool runs goes through [`run`] (or
//! [`run_with_stdin`] for commands that read their job from standard input,
//! like `at`). A call never blocks past its timeout: when the timeout
//! elapses the child is killed and the result carries `timed_out = true`
//! instead of an error. Both output streams are captured in full, however
//! large, without deadlocking the child.
//!
//! Spawn failures (missing binary, permission problems) are the only error
//! case; everything the child itself does - including a non-zero exit - is
//! reported through [`CommandOutput`] for the caller to interpret.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Errors from launching external commands.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command could not be spawned or its output could not be collected.
    #[error("failed to run `{program}`: {source}")]
    Run {
        /// The program that was invoked
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one external command invocation.
///
/// Produced once per invocation and owned by the caller; inspect and discard.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally.
    pub status: Option<i32>,
    /// Captured standard output (lossily decoded).
    pub stdout: String,
    /// Captured standard error (lossily decoded).
    pub stderr: String,
    /// True if the command was killed because its timeout elapsed.
    pub timed_out: bool,
}

impl CommandOutput {
    /// True iff the command ran to completion and exited zero.
    pub fn success(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }

    /// One-line description of a failure, suitable for log lines.
    ///
    /// Includes the exit disposition and whatever the command wrote to its
    /// output streams, trimmed.
    pub fn summary(&self) -> String {
        if self.timed_out {
            return "timed out".to_string();
        }
        let mut parts = vec![match self.status {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }];
        let err = self.stderr.trim();
        if !err.is_empty() {
            parts.push(format!("stderr: {err}"));
        }
        let out = self.stdout.trim();
        if !out.is_empty() {
            parts.push(format!("stdout: {out}"));
        }
        parts.join("; ")
    }

    fn from_std(output: std::process::Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
        }
    }

    fn timed_out() -> Self {
        Self {
            status: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        }
    }
}

/// Run a command to completion, bounded by `timeout`.
pub async fn run(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<CommandOutput, ExecError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(CommandOutput::from_std(output)),
        Ok(Err(source)) => Err(ExecError::Run {
            program: program.to_string(),
            source,
        }),
        // Dropping the output future kills the child (kill_on_drop).
        Err(_elapsed) => Ok(CommandOutput::timed_out()),
    }
}

/// Run a command that reads its input from stdin, bounded by `timeout`.
pub async fn run_with_stdin(
    program: &str,
    args: &[&str],
    cwd: &Path,
    input: &str,
    timeout: Duration,
) -> Result<CommandOutput, ExecError> {
    let run_err = |source| ExecError::Run {
        program: program.to_string(),
        source,
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(run_err)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await.map_err(run_err)?;
        // Dropping the handle closes the pipe so the child sees EOF.
    }

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(CommandOutput::from_std(output)),
        Ok(Err(source)) => Err(run_err(source)),
        Err(_elapsed) => Ok(CommandOutput::timed_out()),
    }
}
