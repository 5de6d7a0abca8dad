//! protopull: mirror the import closure of a protobuf entry set.
//!
//! Clones (or reuses) a few upstream source trees, finds the seed files,
//! follows their `import "...";` lines transitively across trees, and copies
//! exactly the reachable files into one flattened destination directory.
//!
//! The algorithmic core lives in `protopull-closure`; source acquisition in
//! `protopull-fetch`. This crate adds configuration, the CLI and the
//! progress trace.

pub mod cli;
pub mod config;
pub mod report;
pub mod run;

pub use config::{ConfigError, Overrides, ProtopullConfig};
pub use report::Reporter;
