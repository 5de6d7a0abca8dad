//! Staging plan: the source → destination mapping and the copy pass.

use crate::error::{RemapError, StageError};
use crate::remap::PathRemapper;
use crate::resolve::Closure;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a staging pass writes anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMode {
    Copy,
    DryRun,
}

impl StageMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            StageMode::DryRun
        } else {
            StageMode::Copy
        }
    }
}

/// One file to stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Receives one call per staged file, before it is written (or skipped).
pub trait StageObserver {
    fn staging(&mut self, _entry: &StageEntry, _mode: StageMode) {}
}

impl StageObserver for () {}

/// Ordered mapping of every closure file to its destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePlan {
    entries: Vec<StageEntry>,
}

impl StagePlan {
    /// Map every file in `closure` through `remapper`, sorted by source path.
    pub fn build(closure: &Closure, remapper: &PathRemapper) -> Result<Self, RemapError> {
        let entries = closure
            .iter()
            .map(|source| {
                Ok(StageEntry {
                    source: source.to_path_buf(),
                    destination: remapper.remap(source)?,
                })
            })
            .collect::<Result<Vec<_>, RemapError>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[StageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(source, destination)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.entries
            .iter()
            .map(|e| (e.source.as_path(), e.destination.as_path()))
    }

    /// Destinations written by more than one source, with those sources.
    /// The last source in plan order wins on disk.
    pub fn collisions(&self) -> Vec<(&Path, Vec<&Path>)> {
        let mut by_dest: BTreeMap<&Path, Vec<&Path>> = BTreeMap::new();
        for (source, dest) in self.pairs() {
            by_dest.entry(dest).or_default().push(source);
        }
        by_dest
            .into_iter()
            .filter(|(_, sources)| sources.len() > 1)
            .collect()
    }

    /// Check that every source exists.
    pub fn verify(&self) -> Result<(), StageError> {
        match self.entries.iter().find(|e| !e.source.is_file()) {
            Some(entry) => Err(StageError::MissingSource {
                path: entry.source.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Stage every entry. Verifies all sources before the first write; in
    /// [`StageMode::DryRun`] nothing on disk is touched.
    ///
    /// Returns the number of entries processed.
    pub fn execute(
        &self,
        mode: StageMode,
        observer: &mut dyn StageObserver,
    ) -> Result<usize, StageError> {
        self.verify()?;
        for entry in &self.entries {
            observer.staging(entry, mode);
            if mode == StageMode::Copy {
                copy_file(&entry.source, &entry.destination)?;
            }
        }
        tracing::info!(files = self.entries.len(), ?mode, "staging complete");
        Ok(self.entries.len())
    }
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), StageError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|source| StageError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::copy(source, destination).map_err(|e| StageError::Copy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
