//! @dose
//! purpose: Candidate selection for the aggregator. Lists the files of the input directory
//!     whose suffix is in the configured set and that no exclusion glob matches, in
//!     lexicographic order of their relative names.
//!
//! when-editing:
//!     - !The returned order is the output order; keep the sort after any filtering change
//!     - Exclusion globs are matched against the forward-slash relative name
//!
//! invariants:
//!     - Only regular files (or symlinks to them) are candidates
//!     - Without `recursive`, subdirectories are never entered
//!     - node_modules, .git and hidden directories are skipped when recursing
//!
//! gotchas:
//!     - Directory listing order is filesystem-dependent, which is why results are sorted
//!     - Invalid globs are skipped with a warning instead of aborting the run

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Directories that are never entered when recursing
const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".git"];

/// Which files of the input directory are candidates
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    extensions: Vec<String>,
    exclude: Option<GlobSet>,
    recursive: bool,
}

/// A candidate file and its name relative to the input directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub relative: String,
}

impl CandidateFilter {
    pub fn new(extensions: &[String], exclude: &[String], recursive: bool) -> Self {
        Self {
            extensions: extensions.to_vec(),
            exclude: build_exclude_globset(exclude),
            recursive,
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn has_candidate_suffix(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|candidate| candidate == ext))
            .unwrap_or(false)
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude
            .as_ref()
            .map(|set| set.is_match(relative))
            .unwrap_or(false)
    }
}

/// Collect candidates under `root`, sorted by relative name
pub fn collect_candidates(root: &Path, filter: &CandidateFilter) -> Vec<Candidate> {
    let max_depth = if filter.recursive { usize::MAX } else { 1 };
    let mut candidates = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !filter.has_candidate_suffix(path) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative = relative_name(relative);
        if filter.is_excluded(&relative) {
            continue;
        }

        candidates.push(Candidate {
            path: path.to_path_buf(),
            relative,
        });
    }

    candidates.sort_by(|a, b| a.relative.cmp(&b.relative));
    candidates
}

fn relative_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || DEFAULT_EXCLUDED_DIRS.contains(&name.as_ref())
}

/// Build a GlobSet from exclusion patterns
pub fn build_exclude_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                warn!("Invalid exclude pattern '{}': {}", pattern, e);
            }
        }
    }

    builder.build().ok()
}
