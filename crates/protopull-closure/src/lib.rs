//! Import closure resolution and path remapping for protopull.
//!
//! Given a few source trees and a seed set of `.proto` files, computes every
//! file the seeds transitively import and where each one lands in a single
//! flattened destination directory.
//!
//! ## Pipeline (dependency order)
//!
//! ```text
//! seeds     → discover the entry set by glob
//! registry  → import root segment → source tree
//! resolve   → breadth-first closure over `import "...";` lines
//! remap     → strip source root, re-root under destination
//! stage     → source/destination plan, copy or dry run
//! ```

pub mod error;
pub mod imports;
pub mod paths;
pub mod registry;
pub mod remap;
pub mod resolve;
pub mod seeds;
pub mod stage;

pub use error::{RegistryError, RemapError, ResolveError, SeedError, StageError, UnknownRoot};
pub use imports::{Import, extract_imports, read_imports};
pub use registry::{
    DEFAULT_EXTERNAL_ROOTS, ImportTarget, RegistryBuilder, RootEntry, RootLayout, RootRegistry,
};
pub use remap::PathRemapper;
pub use resolve::{Closure, ResolveObserver, Resolver};
pub use seeds::discover_seeds;
pub use stage::{StageEntry, StageMode, StageObserver, StagePlan};
