//! Seed discovery: the entry set the closure starts from.

use crate::error::SeedError;
use crate::paths;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compile a seed pattern.
///
/// Patterns match at any depth below the root, like a recursive glob, unless
/// they start with `/` (anchored at the root) or already start with `**/`.
pub fn seed_pattern(pattern: &str) -> Result<Pattern, SeedError> {
    let effective = if let Some(anchored) = pattern.strip_prefix('/') {
        anchored.to_string()
    } else if pattern.starts_with("**/") {
        pattern.to_string()
    } else {
        format!("**/{pattern}")
    };
    Pattern::new(&effective).map_err(|source| SeedError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Every file under `root` whose root-relative path matches `pattern`.
pub fn discover_seeds(root: &Path, pattern: &str) -> Result<BTreeSet<PathBuf>, SeedError> {
    if !root.is_dir() {
        return Err(SeedError::MissingRoot(root.to_path_buf()));
    }
    let compiled = seed_pattern(pattern)?;

    let mut seeds = BTreeSet::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        // Symlinked files count, same as import targets.
        if !entry.path().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if compiled.matches_with(&slash_path(rel), MATCH_OPTIONS) {
            seeds.insert(paths::normalize(entry.path()));
        }
    }

    if seeds.is_empty() {
        return Err(SeedError::NoSeeds {
            root: root.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }
    tracing::debug!(count = seeds.len(), root = %root.display(), pattern, "discovered seeds");
    Ok(seeds)
}

fn slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
