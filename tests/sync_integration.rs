//! Integration tests for the synchronization engine and publish step.
//!
//! These tests use real git repositories created via tempfile: a working
//! repository wired to a bare "origin", plus a second clone when a test
//! needs the remote to move ahead.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;

use repopulse::engine::{commit_and_push, PublishStage, RetryPolicy, SyncEngine, SyncError, SyncOutcome};
use repopulse::git::{GitRunner, Inspector, StashManager};
use repopulse::git::stash::StashError;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Test fixture: a working repository pushed to a bare origin.
struct TestRepo {
    dir: TempDir,
    origin: TempDir,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let origin = TempDir::new().expect("failed to create temp dir");

        run_git(origin.path(), &["init", "--bare"]);
        // Make clones of the bare repo check out main.
        run_git(origin.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);

        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        fs::write(dir.path().join("file.one"), "one\n").unwrap();
        fs::write(dir.path().join("file.two"), "two\n").unwrap();
        run_git(dir.path(), &["add", "."]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        let origin_path = origin.path().to_string_lossy().to_string();
        run_git(dir.path(), &["remote", "add", "origin", &origin_path]);
        run_git(dir.path(), &["push", "-u", "origin", "main"]);

        Self { dir, origin }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn runner(&self) -> GitRunner {
        GitRunner::new(self.path(), TIMEOUT)
    }

    /// Commit and push a change from a second clone, moving origin ahead.
    fn push_remote_change(&self, file: &str, content: &str, message: &str) {
        let clone = TempDir::new().expect("failed to create temp dir");
        let origin_path = self.origin.path().to_string_lossy().to_string();
        let clone_path = clone.path().to_string_lossy().to_string();
        run_git(clone.path(), &["clone", &origin_path, &clone_path]);
        run_git(clone.path(), &["config", "user.email", "other@example.com"]);
        run_git(clone.path(), &["config", "user.name", "Other User"]);
        fs::write(clone.path().join(file), content).unwrap();
        run_git(clone.path(), &["add", file]);
        run_git(clone.path(), &["commit", "-m", message]);
        run_git(clone.path(), &["push", "origin", "main"]);
    }

    fn head(&self) -> String {
        git_stdout(self.path(), &["rev-parse", "HEAD"])
    }

    fn origin_main(&self) -> String {
        git_stdout(self.origin.path(), &["rev-parse", "refs/heads/main"])
    }

    fn stash_list(&self) -> String {
        git_stdout(self.path(), &["stash", "list"])
    }

    fn status(&self) -> String {
        git_stdout(self.path(), &["status", "--porcelain"])
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn engine_with<'a>(git: &'a GitRunner, attempts: u32) -> SyncEngine<'a> {
    SyncEngine::new(git, "origin", RetryPolicy::new(attempts, Duration::ZERO))
}

// =============================================================================
// Stash Manager
// =============================================================================

#[tokio::test]
async fn protect_on_clean_tree_is_a_noop() {
    let repo = TestRepo::new();
    let git = repo.runner();
    let stash = StashManager::new(&git);

    let handle = stash.protect().await.unwrap();
    assert!(!handle.created);
    assert!(!stash.outstanding());
    assert!(repo.stash_list().is_empty());

    stash.restore(&handle).await.unwrap();
    assert!(repo.status().is_empty());
}

#[tokio::test]
async fn protect_restore_roundtrip_preserves_changes() {
    let repo = TestRepo::new();
    let git = repo.runner();
    let stash = StashManager::new(&git);

    fs::write(repo.path().join("file.one"), "one\nedited\n").unwrap();
    fs::write(repo.path().join("untracked.txt"), "new\n").unwrap();

    let handle = stash.protect().await.unwrap();
    assert!(handle.created);
    assert!(stash.outstanding());
    // The tree is clean while the stash holds the changes.
    assert!(repo.status().is_empty());
    assert!(!repo.stash_list().is_empty());

    stash.restore(&handle).await.unwrap();
    assert!(!stash.outstanding());
    assert!(repo.stash_list().is_empty());
    assert_eq!(
        fs::read_to_string(repo.path().join("file.one")).unwrap(),
        "one\nedited\n"
    );
    assert_eq!(
        fs::read_to_string(repo.path().join("untracked.txt")).unwrap(),
        "new\n"
    );
}

#[tokio::test]
async fn second_protect_is_refused_while_outstanding() {
    let repo = TestRepo::new();
    let git = repo.runner();
    let stash = StashManager::new(&git);

    fs::write(repo.path().join("file.one"), "one\nedited\n").unwrap();
    stash.protect().await.unwrap();

    assert!(matches!(
        stash.protect().await,
        Err(StashError::AlreadyProtected)
    ));
    // Exactly one entry, despite the second call.
    assert_eq!(repo.stash_list().lines().count(), 1);
}

// =============================================================================
// Inspector
// =============================================================================

#[tokio::test]
async fn inspector_answers_match_repository_state() {
    let repo = TestRepo::new();
    let git = repo.runner();
    let inspect = Inspector::new(&git);

    assert!(inspect.is_repository().await.unwrap());
    assert!(inspect.identity_configured().await.unwrap());
    assert!(inspect.remote_reachable("origin").await.unwrap());
    assert!(!inspect.remote_reachable("nonesuch").await.unwrap());
    assert_eq!(inspect.current_branch().await.unwrap(), "main");
    assert!(!inspect.is_dirty().await.unwrap());

    fs::write(repo.path().join("untracked.txt"), "x\n").unwrap();
    assert!(inspect.is_dirty().await.unwrap());
}

// =============================================================================
// Synchronization Engine
// =============================================================================

#[tokio::test]
async fn non_repository_is_a_fatal_precondition_with_no_side_effects() {
    let dir = TempDir::new().unwrap();
    let git = GitRunner::new(dir.path(), TIMEOUT);

    let outcome = engine_with(&git, 3).sync().await;
    match outcome {
        SyncOutcome::FatalPrecondition(reason) => {
            assert!(reason.contains("work tree"), "unexpected reason: {reason}")
        }
        other => panic!("expected FatalPrecondition, got {other:?}"),
    }
    // Nothing was created or mutated.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn blank_identity_is_a_fatal_precondition() {
    let repo = TestRepo::new();
    // A blank local value shadows any global identity.
    run_git(repo.path(), &["config", "user.name", ""]);

    let git = repo.runner();
    let outcome = engine_with(&git, 3).sync().await;
    match outcome {
        SyncOutcome::FatalPrecondition(reason) => {
            assert!(reason.contains("user.name"), "unexpected reason: {reason}")
        }
        other => panic!("expected FatalPrecondition, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_remote_is_a_fatal_precondition() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["remote", "remove", "origin"]);

    let git = repo.runner();
    let outcome = engine_with(&git, 3).sync().await;
    match outcome {
        SyncOutcome::FatalPrecondition(reason) => {
            assert!(reason.contains("remote"), "unexpected reason: {reason}")
        }
        other => panic!("expected FatalPrecondition, got {other:?}"),
    }
}

#[tokio::test]
async fn detached_head_is_a_fatal_precondition() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "--detach"]);

    let git = repo.runner();
    let outcome = engine_with(&git, 3).sync().await;
    match outcome {
        SyncOutcome::FatalPrecondition(reason) => {
            assert!(reason.contains("branch"), "unexpected reason: {reason}")
        }
        other => panic!("expected FatalPrecondition, got {other:?}"),
    }
}

#[tokio::test]
async fn clean_repo_in_sync_succeeds() {
    let repo = TestRepo::new();
    let git = repo.runner();
    let outcome = engine_with(&git, 3).sync().await;
    assert!(outcome.is_success(), "got {outcome:?}");
}

#[tokio::test]
async fn dirty_repo_pulls_remote_changes_and_keeps_local_edits() {
    let repo = TestRepo::new();
    repo.push_remote_change("file.two", "two updated remotely\n", "Remote change");

    fs::write(repo.path().join("file.one"), "one\nlocal edit\n").unwrap();

    let git = repo.runner();
    let outcome = engine_with(&git, 3).sync().await;
    assert!(outcome.is_success(), "got {outcome:?}");

    // Remote change arrived, local edit survived, nothing left stashed.
    assert_eq!(
        fs::read_to_string(repo.path().join("file.two")).unwrap(),
        "two updated remotely\n"
    );
    assert_eq!(
        fs::read_to_string(repo.path().join("file.one")).unwrap(),
        "one\nlocal edit\n"
    );
    assert!(repo.stash_list().is_empty());
    assert_eq!(repo.head(), repo.origin_main());
}

#[tokio::test]
async fn rebase_conflict_is_aborted_and_retries_exhaust() {
    let repo = TestRepo::new();
    repo.push_remote_change("README.md", "# Remote version\n", "Remote edit");

    fs::write(repo.path().join("README.md"), "# Local version\n").unwrap();
    run_git(repo.path(), &["add", "README.md"]);
    run_git(repo.path(), &["commit", "-m", "Local edit"]);
    let local_head = repo.head();

    let git = repo.runner();
    let outcome = engine_with(&git, 2).sync().await;
    match outcome {
        SyncOutcome::ExhaustedRetries(SyncError::Conflict) => {}
        other => panic!("expected exhausted conflict, got {other:?}"),
    }

    // The rebase was aborted: no operation in progress, local commit intact.
    assert!(!repo.path().join(".git/rebase-merge").exists());
    assert!(!repo.path().join(".git/rebase-apply").exists());
    assert_eq!(repo.head(), local_head);
    assert!(repo.status().is_empty());
}

#[tokio::test]
async fn conflicting_stash_is_preserved_when_restore_fails() {
    let repo = TestRepo::new();
    repo.push_remote_change("file.one", "one rewritten remotely\n", "Remote rewrite");

    // Uncommitted local change to the same line the remote rewrote: the
    // pull itself fast-forwards, then the stash pop conflicts.
    fs::write(repo.path().join("file.one"), "one rewritten locally\n").unwrap();

    let git = repo.runner();
    let outcome = engine_with(&git, 1).sync().await;
    match outcome {
        SyncOutcome::ExhaustedRetries(SyncError::StashRestore(_)) => {}
        other => panic!("expected stash restore failure, got {other:?}"),
    }

    // No data loss: the entry is still in the stash list.
    assert!(!repo.stash_list().is_empty());
}

// =============================================================================
// Publish Step
// =============================================================================

#[tokio::test]
async fn publish_stages_exactly_the_named_files() {
    let repo = TestRepo::new();
    fs::write(repo.path().join("file.one"), "one\nchanged\n").unwrap();
    fs::write(repo.path().join("file.two"), "two\nchanged\n").unwrap();
    fs::write(repo.path().join("untracked.txt"), "stray\n").unwrap();

    let git = repo.runner();
    commit_and_push(&git, &["file.one".to_string()], "Refactor logging")
        .await
        .unwrap();

    // Only file.one went into the commit.
    let committed = git_stdout(
        repo.path(),
        &["show", "--name-only", "--format=%s", "HEAD"],
    );
    assert!(committed.starts_with("Refactor logging"));
    assert!(committed.contains("file.one"));
    assert!(!committed.contains("file.two"));

    // The others stayed behind in the working tree.
    let status = repo.status();
    assert!(status.contains("file.two"));
    assert!(status.contains("untracked.txt"));

    // And the commit is on the remote.
    assert_eq!(repo.head(), repo.origin_main());
}

#[tokio::test]
async fn publish_with_nothing_to_commit_fails_at_the_commit_stage() {
    let repo = TestRepo::new();
    let git = repo.runner();

    let err = commit_and_push(&git, &[], "Empty").await.unwrap_err();
    assert_eq!(err.stage, PublishStage::Commit);
}

#[tokio::test]
async fn failed_push_names_its_stage_and_keeps_the_local_commit() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["remote", "set-url", "origin", "/nonexistent/nowhere"]);

    fs::write(repo.path().join("file.one"), "one\nchanged\n").unwrap();
    let before = repo.head();

    let git = repo.runner();
    let err = commit_and_push(&git, &["file.one".to_string()], "Stranded commit")
        .await
        .unwrap_err();
    assert_eq!(err.stage, PublishStage::Push);

    // The local commit exists even though the push failed.
    assert_ne!(repo.head(), before);
    let subject = git_stdout(repo.path(), &["log", "-1", "--format=%s"]);
    assert_eq!(subject, "Stranded commit");
}
