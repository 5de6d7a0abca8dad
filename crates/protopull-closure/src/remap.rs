//! Projects closure files from several source roots onto one destination.

use crate::error::RemapError;
use crate::paths;
use std::path::{Path, PathBuf};

/// Strips a file's source-root prefix and re-roots it under `destination`.
///
/// Files from different roots that share a relative path land on the same
/// destination. That is accepted: the upstream trees share one protobuf
/// namespace. [`crate::StagePlan::collisions`] reports any that occur.
#[derive(Debug, Clone)]
pub struct PathRemapper {
    /// Longest first, so nested roots win over their parents.
    bases: Vec<PathBuf>,
    destination: PathBuf,
}

impl PathRemapper {
    pub fn new<I, P>(bases: I, destination: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut bases: Vec<PathBuf> = bases
            .into_iter()
            .map(|b| paths::normalize(b.as_ref()))
            .collect();
        bases.sort_by(|a, b| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| a.cmp(b))
        });
        bases.dedup();
        Self {
            bases,
            destination: paths::normalize(&destination.into()),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The source root `file` belongs to, if any.
    pub fn base_of(&self, file: &Path) -> Option<&Path> {
        self.bases
            .iter()
            .find(|base| file.starts_with(base) && file != base.as_path())
            .map(PathBuf::as_path)
    }

    /// Destination path for `file`.
    pub fn remap(&self, file: &Path) -> Result<PathBuf, RemapError> {
        let file = paths::normalize(file);
        let rel = self
            .base_of(&file)
            .and_then(|base| file.strip_prefix(base).ok())
            .ok_or_else(|| RemapError::OutsideRoots { path: file.clone() })?;
        Ok(self.destination.join(rel))
    }
}
