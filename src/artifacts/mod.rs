//! Archive index data structures
//!
//! This module contains the binary building blocks of an archive index:
//!
//! - `core`: Packing traits shared by every fixed-width record
//! - `index`: Entries, segments, layouts, checksums and offset decoding
//!
//! The file-level codec that stitches these together lives in `areas`.

pub mod core;
pub mod index;
