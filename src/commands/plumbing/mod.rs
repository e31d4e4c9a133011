//! Plumbing commands
//!
//! - `inspect`: Print the segment table of an index
//! - `resolve`: Print where a path's data lives
//! - `verify`: Check every stored SHA-1 value

pub mod inspect;
pub mod resolve;
pub mod verify;
