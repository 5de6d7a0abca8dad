//! Human-readable progress trace on stdout.
//!
//! One line per file entering the closure, one indented line per import it
//! declares, a count, then a block per staged file. Dry runs print the same
//! blocks with "would copy" in place of "copying".

use protopull_closure::{Import, ResolveObserver, StageEntry, StageMode, StageObserver};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

/// Writes the trace to any writer.
///
/// A write failure never interrupts the pipeline. The first one is kept and
/// later writes are skipped; [`Reporter::take_error`] hands it back once the
/// run is over.
pub struct Reporter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Flush, then return the first write error seen, if any.
    pub fn take_error(&mut self) -> io::Result<()> {
        if self.error.is_none() {
            if let Err(e) = self.out.flush() {
                self.error = Some(e);
            }
        }
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_fmt(args) {
            tracing::warn!(error = %e, "progress trace write failed");
            self.error = Some(e);
        }
    }

    pub fn closure_found(&mut self, count: usize) {
        self.emit(format_args!("found {count} valid protos\n"));
    }

    pub fn collision(&mut self, destination: &Path, sources: &[&Path]) {
        self.emit(format_args!(
            "warning: {} sources map to {}:\n",
            sources.len(),
            destination.display()
        ));
        for source in sources {
            self.emit(format_args!("  {}\n", source.display()));
        }
    }

    pub fn finished(&mut self, staged: usize, destination: &Path, mode: StageMode) {
        let verb = match mode {
            StageMode::Copy => "copied",
            StageMode::DryRun => "would copy",
        };
        self.emit(format_args!(
            "{verb} {staged} proto files into {}\n",
            destination.display()
        ));
    }
}

impl<W: Write> ResolveObserver for Reporter<W> {
    fn file_entered(&mut self, path: &Path) {
        self.emit(format_args!("{}\n", path.display()));
    }

    fn dependency(&mut self, _from: &Path, _import: &Import, target: &Path) {
        self.emit(format_args!("  > {}\n", target.display()));
    }

    fn external(&mut self, _from: &Path, import: &Import) {
        self.emit(format_args!("  > {} (external)\n", import.path));
    }
}

impl<W: Write> StageObserver for Reporter<W> {
    fn staging(&mut self, entry: &StageEntry, mode: StageMode) {
        let header = match mode {
            StageMode::Copy => "copying proto file:",
            StageMode::DryRun => "would copy proto file:",
        };
        self.emit(format_args!(
            "{header}\n  src:  {}\n  dest: {}\n\n",
            entry.source.display(),
            entry.destination.display()
        ));
    }
}
