//! Root registry: maps an import's leading segment to a source tree.

use crate::error::{RegistryError, UnknownRoot};
use crate::imports::Import;
use crate::paths;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Namespaces assumed to be bundled with every protobuf toolchain.
pub const DEFAULT_EXTERNAL_ROOTS: &[&str] = &["google"];

/// How import paths map onto a root's base path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootLayout {
    /// The base path is a checkout whose top-level directory is named after
    /// the root. `tensorflow/core/x.proto` lives at `<base>/tensorflow/core/x.proto`.
    #[default]
    Nested,
    /// The base path is the root's own directory. `tensorflow/core/x.proto`
    /// lives at `<base>/core/x.proto`.
    Flat,
}

/// A registered source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootEntry {
    name: String,
    base_path: PathBuf,
    layout: RootLayout,
}

impl RootEntry {
    pub fn new(name: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            layout: RootLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: RootLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn layout(&self) -> RootLayout {
        self.layout
    }

    /// The file an import owned by this root refers to.
    pub fn file_for(&self, import: &Import) -> PathBuf {
        let joined = match self.layout {
            RootLayout::Nested => self.base_path.join(&import.path),
            RootLayout::Flat => import
                .rest()
                .fold(self.base_path.clone(), |acc, seg| acc.join(seg)),
        };
        paths::normalize(&joined)
    }
}

/// Where an import points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Satisfied outside the mirrored trees; never resolved or copied.
    External,
    /// A file inside a registered root.
    File(PathBuf),
}

/// Immutable mapping from root names to source trees.
#[derive(Debug, Clone)]
pub struct RootRegistry {
    entries: Vec<RootEntry>,
    external: BTreeSet<String>,
}

impl RootRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a root by name.
    pub fn lookup(&self, name: &str) -> Result<&RootEntry, UnknownRoot> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| UnknownRoot {
                root: name.to_string(),
            })
    }

    pub fn is_external(&self, name: &str) -> bool {
        self.external.contains(name)
    }

    /// Decide what an import refers to.
    pub fn classify(&self, import: &Import) -> Result<ImportTarget, UnknownRoot> {
        let root = import.root();
        if self.is_external(root) {
            return Ok(ImportTarget::External);
        }
        let entry = self.lookup(root)?;
        Ok(ImportTarget::File(entry.file_for(import)))
    }

    pub fn entries(&self) -> &[RootEntry] {
        &self.entries
    }

    pub fn external_roots(&self) -> impl Iterator<Item = &str> {
        self.external.iter().map(String::as_str)
    }

    /// Base paths of every registered root, in registration order.
    pub fn base_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.base_path.as_path())
    }
}

/// Collects roots and external names, then freezes them into a [`RootRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    entries: Vec<RootEntry>,
    external: BTreeSet<String>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            external: DEFAULT_EXTERNAL_ROOTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RegistryBuilder {
    pub fn root(mut self, entry: RootEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Replace the externally satisfied set.
    pub fn external_roots<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn external(mut self, name: impl Into<String>) -> Self {
        self.external.insert(name.into());
        self
    }

    pub fn build(self) -> Result<RootRegistry, RegistryError> {
        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(self.entries.len());
        for mut entry in self.entries {
            if !seen.insert(entry.name.clone()) {
                return Err(RegistryError::DuplicateRoot(entry.name));
            }
            if self.external.contains(&entry.name) {
                return Err(RegistryError::ExternalConflict(entry.name));
            }
            entry.base_path =
                paths::absolute(&entry.base_path).map_err(|source| RegistryError::BasePath {
                    name: entry.name.clone(),
                    source,
                })?;
            entries.push(entry);
        }
        Ok(RootRegistry {
            entries,
            external: self.external,
        })
    }
}
