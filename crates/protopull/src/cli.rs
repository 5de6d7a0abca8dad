//! Command-line surface.

use crate::config::{Overrides, ProtopullConfig};
use crate::report::Reporter;
use crate::run;
use anyhow::Context;
use clap::{ArgAction, Parser};
use protopull_closure::StageMode;
use protopull_fetch::SourceCache;
use std::path::PathBuf;

/// Mirror the protobuf files a seed set transitively imports from several
/// source trees into one flattened directory.
#[derive(Debug, Parser)]
#[command(name = "protopull", version)]
pub struct Cli {
    /// Version tag checked out for every git source [default: r2.8]
    #[arg(long, visible_alias = "tensorflow-version", value_name = "TAG")]
    pub tag: Option<String>,

    /// Print the source -> destination mapping without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file [default: ./protopull.toml when present]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Scratch directory for git checkouts
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Output directory for the mirrored files
    #[arg(long = "dest", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            tag: self.tag.clone(),
            working_dir: self.working_dir.clone(),
            destination: self.destination.clone(),
        }
    }

    pub fn mode(&self) -> StageMode {
        StageMode::from_dry_run(self.dry_run)
    }
}

/// Run the command with stdout as the progress trace.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let config = ProtopullConfig::load(cli.config.as_deref(), &cwd)?.apply(cli.overrides());
    config.validate()?;
    tracing::debug!(?config, "effective configuration");

    let cache = SourceCache::new(&config.working_dir);
    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    run::run(&config, cli.mode(), &cache, &mut reporter)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["protopull"]).unwrap();
        assert_eq!(cli.tag, None);
        assert!(!cli.dry_run);
        assert_eq!(cli.mode(), StageMode::Copy);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "protopull",
            "--tensorflow-version",
            "r2.11",
            "--dry-run",
            "--dest",
            "out",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.tag.as_deref(), Some("r2.11"));
        assert_eq!(cli.mode(), StageMode::DryRun);
        assert_eq!(cli.destination, Some(PathBuf::from("out")));
        assert_eq!(cli.verbose, 2);
    }
}
