//! Archive index codec
//!
//! Reads, verifies, mutates and rewrites the sorted, SHA-1 checked index
//! files that map asset paths to offsets inside sharded data files, and
//! reports every offset change to a caller-supplied transaction.

pub mod areas;
pub mod artifacts;
pub mod commands;
