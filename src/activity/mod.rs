//! activity
//!
//! Randomized working-tree churn: the file mutation that gives each run
//! something to commit, and the pool-backed commit message that labels it.
//!
//! Everything here is deliberately stateless glue; the interesting failure
//! handling lives in [`crate::engine`].

pub mod messages;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use rand::Rng;
use thiserror::Error;
use tracing::info;

/// Characters eligible for appended filler text.
const APPEND_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ ";

/// Longest run of random characters appended to a single file.
const MAX_APPEND_LEN: usize = 200;

/// Errors from file mutation.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// No mutation candidates exist, so a run would have nothing to commit.
    #[error("no files matching `{prefix}*` in {root}")]
    NoCandidates {
        /// The configured name prefix
        prefix: String,
        /// The directory that was searched
        root: PathBuf,
    },

    /// Reading the directory or writing a file failed.
    #[error("failed to update files: {0}")]
    Io(#[from] std::io::Error),
}

/// Append a random comment line to a random non-empty subset of the files
/// in `root` whose names start with `prefix`.
///
/// Returns the relative paths that were actually modified, sorted.
pub fn update_files(
    root: &Path,
    prefix: &str,
    rng: &mut impl Rng,
) -> Result<Vec<String>, ActivityError> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            if name.starts_with(prefix) {
                candidates.push(name);
            }
        }
    }
    candidates.sort();
    if candidates.is_empty() {
        return Err(ActivityError::NoCandidates {
            prefix: prefix.to_string(),
            root: root.to_path_buf(),
        });
    }

    let count = rng.random_range(1..=candidates.len());
    let mut picked: Vec<String> = candidates
        .choose_multiple(rng, count)
        .cloned()
        .collect();
    picked.sort();

    for name in &picked {
        let length = rng.random_range(1..=MAX_APPEND_LEN);
        let text: String = (0..length)
            .map(|_| APPEND_CHARSET[rng.random_range(0..APPEND_CHARSET.len())] as char)
            .collect();
        let mut file = OpenOptions::new().append(true).open(root.join(name))?;
        write!(file, "\n# {text}\n")?;
        info!(file = %name, chars = length, "appended random content");
    }

    Ok(picked)
}
