//! git::conflict
//!
//! Unmerged-path detection and best-effort rebase abort.
//!
//! # Invariants
//!
//! - [`abort_rebase`] is only called after a pull attempt has already come
//!   back non-success; it must never run speculatively, or it could tear
//!   down a rebase started by another process

use tracing::{debug, info, warn};

use super::GitRunner;

/// Porcelain XY codes that mark an unmerged path.
const UNMERGED_CODES: [&str; 7] = ["DD", "AU", "UD", "UA", "DU", "AA", "UU"];

/// True iff the porcelain status text contains unmerged-path markers.
pub fn has_conflicts(porcelain: &str) -> bool {
    porcelain
        .lines()
        .any(|line| line.get(..2).is_some_and(|xy| UNMERGED_CODES.contains(&xy)))
}

/// Abort an in-progress rebase, best-effort.
///
/// Failure is logged rather than propagated: the repository may not be
/// mid-rebase at all, in which case git refuses and there is nothing to do.
pub async fn abort_rebase(git: &GitRunner) {
    match git.git(&["rebase", "--abort"]).await {
        Ok(out) if out.success() => info!("aborted in-progress rebase"),
        Ok(out) => debug!("rebase --abort declined: {}", out.summary()),
        Err(err) => warn!(error = %err, "could not invoke rebase --abort"),
    }
}
