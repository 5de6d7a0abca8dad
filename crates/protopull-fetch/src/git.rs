//! Shallow single-tag clones via the `git` executable.

use crate::AcquireError;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// How to invoke git.
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
            leading_args: Vec::new(),
        }
    }
}

impl GitCommand {
    /// Run `program leading_args.. clone ...` instead of `git clone ...`.
    pub fn new<I, S>(program: impl Into<OsString>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    /// `git clone --depth 1 -b <tag> --single-branch <url> <dest>`.
    pub fn clone_shallow(&self, url: &str, tag: &str, dest: &Path) -> Result<(), AcquireError> {
        let status = Command::new(&self.program)
            .args(&self.leading_args)
            .args(["clone", "--depth", "1", "-b", tag, "--single-branch", url])
            .arg(dest)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| AcquireError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        if !status.success() {
            return Err(AcquireError::Clone {
                url: url.to_string(),
                tag: tag.to_string(),
                status,
            });
        }
        Ok(())
    }
}
