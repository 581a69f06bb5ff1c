//! gitsync - continuously mirror Git repositories between remotes.
//!
//! A declarative configuration names repositories and mappings (one
//! source, one or more targets, branch/tag selectors, an interval).
//! The engine fetches selected refs from each source and force-pushes
//! them to every target, one concurrent loop per mapping.

#![forbid(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod core;
pub mod dryrun;
pub mod engine;
pub mod logging;
pub mod signals;
