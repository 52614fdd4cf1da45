//! Repopulse - scheduled low-stakes repository activity
//!
//! Repopulse is a single-binary tool that keeps a git repository gently
//! active: it reconciles the working tree with its remote, appends randomized
//! content to a set of tracked files, commits with a message drawn from a
//! pool, pushes, and can register randomized one-shot runs of itself across
//! the rest of the day.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Synchronization engine, retry policy, and publish step
//! - [`git`] - Single doorway for all git operations
//! - [`exec`] - Bounded external command execution
//! - [`core`] - Configuration schema and loading
//! - [`activity`] - Randomized file mutation and commit-message selection
//! - [`sched`] - Randomized one-shot job registration via `at`
//!
//! # Correctness Invariants
//!
//! 1. No mutating git command runs before the precondition checks pass
//! 2. A protective stash is either restored or left in the stash list and
//!    logged - never silently dropped
//! 3. Misconfiguration is surfaced immediately, never retried
//! 4. The process never fails loudly: every failure path ends in a log line

pub mod activity;
pub mod cli;
pub mod core;
pub mod engine;
pub mod exec;
pub mod git;
pub mod sched;
