//! Lexical path normalisation.
//!
//! File identity in the closure is path equality, so every path that enters
//! the resolver goes through [`normalize`] first. Normalisation is purely
//! lexical: symlinks are not followed and the filesystem is not consulted.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into its parent.
///
/// A `..` that would climb above the root (or above the start of a relative
/// path) is kept, since there is nothing to fold it into.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against the current directory, then normalise it.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}
