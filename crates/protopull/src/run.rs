//! The full pipeline: acquire → registry → seeds → closure → remap → stage.
//!
//! Phases run strictly in order and the first failure aborts the run before
//! anything is written to the destination.

use crate::config::ProtopullConfig;
use crate::report::Reporter;
use anyhow::Context;
use protopull_closure::{
    Closure, PathRemapper, Resolver, RootEntry, RootRegistry, StageMode, StagePlan,
    discover_seeds,
};
use protopull_fetch::Acquire;
use std::io::Write;
use std::path::PathBuf;

/// What a completed run did.
#[derive(Debug)]
pub struct Outcome {
    pub closure: Closure,
    pub plan: StagePlan,
    pub destination: PathBuf,
    pub staged: usize,
}

/// Acquire every source and build the registry over the resulting trees.
pub fn build_registry(
    config: &ProtopullConfig,
    acquirer: &dyn Acquire,
) -> anyhow::Result<RootRegistry> {
    let mut builder = RootRegistry::builder().external_roots(config.external_roots.iter().cloned());
    for source in &config.sources {
        let dir = acquirer
            .acquire(&source.spec()?, &config.tag)
            .with_context(|| format!("acquiring source `{}`", source.name))?;
        tracing::info!(source = %source.name, path = %dir.display(), "source ready");
        builder = builder.root(RootEntry::new(&source.name, dir).with_layout(source.layout.into()));
    }
    builder.build().context("building root registry")
}

pub fn run<W: Write>(
    config: &ProtopullConfig,
    mode: StageMode,
    acquirer: &dyn Acquire,
    reporter: &mut Reporter<W>,
) -> anyhow::Result<Outcome> {
    let registry = build_registry(config, acquirer)?;

    let seed_root = registry.lookup(&config.seeds.source)?.base_path();
    let seeds = discover_seeds(seed_root, &config.seeds.pattern)
        .with_context(|| format!("discovering seeds in source `{}`", config.seeds.source))?;
    tracing::info!(seeds = seeds.len(), "resolving closure");

    let closure = Resolver::new(&registry).resolve(&seeds, reporter)?;
    reporter.closure_found(closure.len());

    let destination = std::path::absolute(&config.destination).with_context(|| {
        format!(
            "resolving destination {}",
            config.destination.display()
        )
    })?;
    let remapper = PathRemapper::new(registry.base_paths(), &destination);
    let plan = StagePlan::build(&closure, &remapper)?;

    for (dest, sources) in plan.collisions() {
        tracing::warn!(
            destination = %dest.display(),
            sources = sources.len(),
            "multiple sources map to one destination; the last one wins"
        );
        reporter.collision(dest, &sources);
    }

    if mode == StageMode::Copy {
        std::fs::create_dir_all(&destination)
            .with_context(|| format!("creating {}", destination.display()))?;
    }
    let staged = plan.execute(mode, reporter)?;
    reporter.finished(staged, &destination, mode);
    reporter.take_error().context("writing progress trace")?;

    Ok(Outcome {
        closure,
        plan,
        destination,
        staged,
    })
}
