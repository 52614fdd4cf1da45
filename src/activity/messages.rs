//! activity::messages
//!
//! Commit messages drawn from a plain-text pool, one candidate per line.
//!
//! An unreadable or empty pool is fatal to the run: committing with a
//! made-up fallback message would defeat the point of curating the pool.

use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use rand::Rng;
use thiserror::Error;
use tracing::info;

/// Errors from commit-message selection.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The pool file could not be read.
    #[error("failed to read message pool {path}: {source}")]
    Unreadable {
        /// The pool file that was attempted
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The pool file contains no usable lines.
    #[error("message pool {path} has no usable lines")]
    Empty {
        /// The pool file that was read
        path: PathBuf,
    },
}

/// Pick one commit message uniformly from the pool at `path`.
///
/// Blank lines are skipped; surrounding whitespace is trimmed.
pub fn random_message(path: &Path, rng: &mut impl Rng) -> Result<String, MessageError> {
    let raw = fs::read_to_string(path).map_err(|source| MessageError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let candidates: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let message = candidates
        .choose(rng)
        .map(|line| line.to_string())
        .ok_or_else(|| MessageError::Empty {
            path: path.to_path_buf(),
        })?;
    info!(%message, "selected commit message");
    Ok(message)
}
