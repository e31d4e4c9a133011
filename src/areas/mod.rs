//! Index file components
//!
//! - `archive`: Command-facing handle pairing an index store with an output writer
//! - `index_file`: In-memory index codec (decode, lookups, mutation, layout)
//! - `index_store`: Locked reads and writes of index files on disk
//! - `transaction`: Change-reporting overlay and the in-memory offset journal

pub mod archive;
pub mod index_file;
pub mod index_store;
pub mod transaction;
