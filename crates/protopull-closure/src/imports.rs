//! Best-effort import extraction.
//!
//! Only the single-line form `import "<path>";` anchored at the start of a
//! line is recognised. `import public`, `import weak`, single quotes, leading
//! whitespace and statements split across lines are invisible to it. This is
//! a line matcher, not a protobuf parser.

use crate::error::ResolveError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import "(?P<path>[a-zA-Z0-9/_.]+)";"#).expect("import pattern compiles")
});

/// One import declaration found in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Import {
    /// The quoted path, exactly as written.
    pub path: String,
    /// 1-based line number.
    pub line: usize,
}

impl Import {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// First path segment: the namespace that owns this import.
    pub fn root(&self) -> &str {
        self.path.split('/').next().unwrap_or_default()
    }

    /// Segments after the root, in order.
    pub fn rest(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').skip(1).filter(|s| !s.is_empty())
    }
}

/// Extract every import declaration from file contents.
pub fn extract_imports(text: &str) -> Vec<Import> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            IMPORT_LINE
                .captures(line)
                .map(|caps| Import::new(&caps["path"], idx + 1))
        })
        .collect()
}

/// Read a file and extract its imports.
///
/// Invalid UTF-8 elsewhere in the file is tolerated; import paths are ASCII.
pub fn read_imports(path: &Path) -> Result<Vec<Import>, ResolveError> {
    let bytes = std::fs::read(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(extract_imports(&String::from_utf8_lossy(&bytes)))
}
