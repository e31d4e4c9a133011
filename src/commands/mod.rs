//! Command implementations
//!
//! - `plumbing`: Read-only views of an index (inspect, resolve, verify)
//! - `porcelain`: Commands that rewrite an index on disk (set-offset)

pub mod plumbing;
pub mod porcelain;
