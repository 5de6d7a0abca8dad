//! Source tree acquisition for protopull.
//!
//! Turns a logical source name plus a version tag into a local directory
//! whose layout mirrors the upstream project. Git sources are cloned once
//! into a scratch directory and reused on later runs; local sources are
//! taken as-is.
//!
//! A clone is made into `<name>.partial` and only renamed to `<name>` after
//! git reports success, so an interrupted or failed clone never leaves a
//! directory that a rerun would mistake for a complete tree.

pub mod git;

pub use git::GitCommand;

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Where a source tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Remote repository, cloned at the requested tag.
    Git { url: String },
    /// Pre-existing directory (mount, vendored copy, manual checkout).
    Local { path: PathBuf },
}

/// A named source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: String,
    pub origin: Origin,
}

impl SourceSpec {
    pub fn git(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: Origin::Git { url: url.into() },
        }
    }

    pub fn local(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            origin: Origin::Local { path: path.into() },
        }
    }
}

/// Source acquisition failure. Always fatal: a partial tree would yield a
/// silently incomplete closure.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git clone of {url} at `{tag}` failed ({status})")]
    Clone {
        url: String,
        tag: String,
        status: ExitStatus,
    },

    #[error("local source `{name}` is not a directory: {}", .path.display())]
    MissingLocal { name: String, path: PathBuf },

    #[error("filesystem error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Produces a local directory for a source at a tag.
pub trait Acquire {
    fn acquire(&self, spec: &SourceSpec, tag: &str) -> Result<PathBuf, AcquireError>;
}

/// Scratch directory holding one checkout per git source.
#[derive(Debug, Clone)]
pub struct SourceCache {
    working_dir: PathBuf,
    git: GitCommand,
}

impl SourceCache {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            git: GitCommand::default(),
        }
    }

    pub fn with_git(mut self, git: GitCommand) -> Self {
        self.git = git;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Where the checkout of `name` lives (whether or not it exists yet).
    pub fn checkout_dir(&self, name: &str) -> PathBuf {
        self.working_dir.join(name)
    }

    fn clone_into_place(&self, name: &str, url: &str, tag: &str) -> Result<PathBuf, AcquireError> {
        let dest = self.checkout_dir(name);
        if dest.exists() {
            tracing::info!(source = name, path = %dest.display(), "checkout present, skipping clone");
            return Ok(dest);
        }

        std::fs::create_dir_all(&self.working_dir).map_err(|source| AcquireError::Io {
            path: self.working_dir.clone(),
            source,
        })?;

        let partial = self.working_dir.join(format!("{name}.partial"));
        remove_if_present(&partial)?;

        tracing::info!(source = name, url, tag, "cloning");
        if let Err(e) = self.git.clone_shallow(url, tag, &partial) {
            let _ = remove_if_present(&partial);
            return Err(e);
        }

        std::fs::rename(&partial, &dest).map_err(|source| AcquireError::Io {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }
}

impl Acquire for SourceCache {
    fn acquire(&self, spec: &SourceSpec, tag: &str) -> Result<PathBuf, AcquireError> {
        let dir = match &spec.origin {
            Origin::Git { url } => self.clone_into_place(&spec.name, url, tag)?,
            Origin::Local { path } => {
                if !path.is_dir() {
                    return Err(AcquireError::MissingLocal {
                        name: spec.name.clone(),
                        path: path.clone(),
                    });
                }
                path.clone()
            }
        };
        std::path::absolute(&dir).map_err(|source| AcquireError::Io { path: dir, source })
    }
}

fn remove_if_present(path: &Path) -> Result<(), AcquireError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|source| AcquireError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
