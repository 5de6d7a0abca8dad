//! Error types for registry lookup, resolution, remapping and staging.

use std::io;
use std::path::{Path, PathBuf};

/// An import's leading segment names no registered source root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown root `{root}`")]
pub struct UnknownRoot {
    pub root: String,
}

/// Failure while building a [`crate::RootRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate root `{0}`")]
    DuplicateRoot(String),

    #[error("root `{0}` is registered as a source and also marked external")]
    ExternalConflict(String),

    #[error("cannot make base path of root `{name}` absolute")]
    BasePath {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Failure while computing the import closure.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no seed files to resolve")]
    EmptySeeds,

    #[error("{root} in import \"{import}\" ({})", .importer.display())]
    UnknownRoot {
        root: UnknownRoot,
        import: String,
        importer: PathBuf,
    },

    #[error(
        "required file does not exist: {}{}",
        .path.display(),
        origin_suffix(.import.as_deref(), .imported_by.as_deref())
    )]
    MissingFile {
        path: PathBuf,
        import: Option<String>,
        imported_by: Option<PathBuf>,
    },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    /// The unregistered root segment, if this is an unknown-root failure.
    pub fn unknown_root(&self) -> Option<&str> {
        match self {
            ResolveError::UnknownRoot { root, .. } => Some(&root.root),
            _ => None,
        }
    }
}

fn origin_suffix(import: Option<&str>, imported_by: Option<&Path>) -> String {
    match (import, imported_by) {
        (Some(import), Some(by)) => format!(" (import \"{}\" in {})", import, by.display()),
        (None, Some(by)) => format!(" (imported by {})", by.display()),
        (Some(import), None) => format!(" (import \"{}\")", import),
        (None, None) => " (seed)".to_string(),
    }
}

/// A closure file could not be projected onto the destination.
#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error("{} is not under any known source root", .path.display())]
    OutsideRoots { path: PathBuf },
}

/// Failure while staging files into the destination.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("staged source does not exist: {}", .path.display())]
    MissingSource { path: PathBuf },

    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {} to {}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Seed discovery failure.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed root {} is not a directory", .0.display())]
    MissingRoot(PathBuf),

    #[error("invalid seed pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no files under {} match `{pattern}`", .root.display())]
    NoSeeds { root: PathBuf, pattern: String },

    #[error("failed to walk seed root")]
    Walk(#[from] walkdir::Error),
}
