//! Transitive import closure by breadth-first frontier expansion.
//!
//! The graph is discovered lazily: a file's edges are only known once the
//! file has been read. Each round moves the whole frontier into the closure,
//! reads every file in it, and schedules any import target not yet in the
//! closure for the next round. A file enters the closure at most once, so
//! cycles and self-imports terminate.

use crate::error::ResolveError;
use crate::imports::{Import, read_imports};
use crate::paths;
use crate::registry::{ImportTarget, RootRegistry};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Receives resolution events as they happen.
///
/// All methods default to no-ops so implementors pick what they need.
pub trait ResolveObserver {
    /// A file was moved from the frontier into the closure and is about to be read.
    fn file_entered(&mut self, _path: &Path) {}

    /// `from` imports `target` through `import`.
    fn dependency(&mut self, _from: &Path, _import: &Import, _target: &Path) {}

    /// `from` imports an externally satisfied namespace.
    fn external(&mut self, _from: &Path, _import: &Import) {}
}

impl ResolveObserver for () {}

/// The result of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    files: BTreeSet<PathBuf>,
    edges: BTreeSet<(PathBuf, PathBuf)>,
    rounds: usize,
}

impl Closure {
    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    pub fn into_files(self) -> BTreeSet<PathBuf> {
        self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// Number of frontier expansions performed.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Every resolved `importer -> imported` edge.
    pub fn edges(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.edges.iter().map(|(a, b)| (a.as_path(), b.as_path()))
    }

    /// Files that import `path`. Empty for seeds nothing else imports.
    pub fn importers_of(&self, path: &Path) -> Vec<&Path> {
        self.edges()
            .filter(|(_, to)| *to == path)
            .map(|(from, _)| from)
            .collect()
    }
}

/// Computes import closures against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a RootRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a RootRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the closure of `seeds`.
    ///
    /// Fails on the first import naming an unregistered root, the first
    /// import whose target file does not exist, or the first unreadable file.
    pub fn resolve<I>(
        &self,
        seeds: I,
        observer: &mut dyn ResolveObserver,
    ) -> Result<Closure, ResolveError>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut frontier: BTreeSet<PathBuf> = seeds
            .into_iter()
            .map(|p| paths::normalize(p.as_ref()))
            .collect();
        if frontier.is_empty() {
            return Err(ResolveError::EmptySeeds);
        }
        if let Some(missing) = frontier.iter().find(|p| !p.is_file()) {
            return Err(ResolveError::MissingFile {
                path: missing.clone(),
                import: None,
                imported_by: None,
            });
        }

        let mut closure = Closure::default();
        while !frontier.is_empty() {
            closure.rounds += 1;
            let current = std::mem::take(&mut frontier);
            closure.files.extend(current.iter().cloned());
            tracing::debug!(
                round = closure.rounds,
                files = current.len(),
                "expanding frontier"
            );

            for file in &current {
                observer.file_entered(file);
                for import in read_imports(file)? {
                    let target = self.resolve_import(file, &import)?;
                    match target {
                        ImportTarget::External => {
                            tracing::trace!(from = %file.display(), import = %import.path, "external");
                            observer.external(file, &import);
                        }
                        ImportTarget::File(target) => {
                            tracing::trace!(
                                from = %file.display(),
                                to = %target.display(),
                                "dependency"
                            );
                            observer.dependency(file, &import, &target);
                            if !closure.files.contains(&target) {
                                frontier.insert(target.clone());
                            }
                            closure.edges.insert((file.clone(), target));
                        }
                    }
                }
            }
        }

        tracing::debug!(
            files = closure.len(),
            rounds = closure.rounds,
            "closure complete"
        );
        Ok(closure)
    }

    fn resolve_import(&self, file: &Path, import: &Import) -> Result<ImportTarget, ResolveError> {
        let target = self
            .registry
            .classify(import)
            .map_err(|root| ResolveError::UnknownRoot {
                root,
                import: import.path.clone(),
                importer: file.to_path_buf(),
            })?;
        if let ImportTarget::File(path) = &target {
            if !path.is_file() {
                return Err(ResolveError::MissingFile {
                    path: path.clone(),
                    import: Some(import.path.clone()),
                    imported_by: Some(file.to_path_buf()),
                });
            }
        }
        Ok(target)
    }
}
