//! Archive index file format
//!
//! An index maps hashed asset paths to encoded offsets inside the sharded data
//! files of an archive. Two flavours exist side by side for every archive:
//! `.index` files key entries by separate folder and file-name hashes, while
//! `.index2` files key them by a single hash of the full path.
//!
//! ## File Format
//!
//! ```text
//! Header (format dependent, 1024 bytes for SqPack):
//!   - Opaque bytes, last 64 bytes reserved for a SHA-1 of the rest
//!
//! Segment header block (segment_header_block_size bytes):
//!   - Block size (4 bytes)
//!   - Per segment: unknown:i32, offset:u32, size:u32, sha1:[u8; 20]
//!     followed by that segment's header padding
//!   - Last 64 bytes reserved for a SHA-1 of the rest of the block
//!
//! Segment bodies:
//!   - Sorted fixed-size entries, one contiguous run per segment
//! ```
//!
//! All multi-byte fields are little-endian.

pub mod checksum;
pub mod entry;
pub mod error;
pub mod layout;
pub mod path_hash;
pub mod raw_offset;
pub mod segment;

use crate::artifacts::index::error::IndexError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Size of a SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Reserved slot at the tail of the header and of the segment header block
pub const HASH_SLOT_SIZE: usize = 64;

/// Leading size field of the segment header block
pub const BLOCK_SIZE_FIELD: usize = 4;

/// Fixed part of a segment header record: unknown, offset, size, sha1
pub const SEGMENT_RECORD_SIZE: usize = 12 + CHECKSUM_SIZE;

/// SqPack header size
pub const SQPACK_HEADER_SIZE: usize = 1024;

/// SqPack segment header block size
pub const SQPACK_SEGMENT_HEADER_BLOCK_SIZE: usize = 1024;

/// Size of a folder/file hash entry in `.index` files
pub const SPLIT_ENTRY_SIZE: usize = 16;

/// Size of a full path hash entry in `.index2` files
pub const FULL_ENTRY_SIZE: usize = 8;

/// Size of a folder summary entry
pub const FOLDER_ENTRY_SIZE: usize = 16;

/// Index flavour, which fixes the entry size and the hashing scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// `.index`: folder hash + file name hash, 16-byte entries
    Index,
    /// `.index2`: full path hash, 8-byte entries
    Index2,
}

impl IndexKind {
    pub fn entry_size(self) -> usize {
        match self {
            IndexKind::Index => SPLIT_ENTRY_SIZE,
            IndexKind::Index2 => FULL_ENTRY_SIZE,
        }
    }

    /// Detect the kind from a file extension (`.index` or `.index2`)
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "index" => Some(IndexKind::Index),
            "index2" => Some(IndexKind::Index2),
            _ => None,
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Index => write!(f, "index"),
            IndexKind::Index2 => write!(f, "index2"),
        }
    }
}

impl FromStr for IndexKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "index" | "index1" => Ok(IndexKind::Index),
            "index2" => Ok(IndexKind::Index2),
            other => Err(IndexError::UnknownKind(other.to_string())),
        }
    }
}

/// Identity of the data file family an index belongs to (e.g. `040000`)
///
/// Reported alongside every offset change so a transaction can tell which
/// archive a mutation touched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ArchiveId(String);

impl ArchiveId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the archive id from an index file name such as `040000.win32.index2`
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = name.split('.').next().unwrap_or_default();

        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("040000.win32.index", Some(IndexKind::Index))]
    #[case("040000.win32.index2", Some(IndexKind::Index2))]
    #[case("040000.win32.dat0", None)]
    #[case("040000", None)]
    fn test_kind_from_path(#[case] name: &str, #[case] expected: Option<IndexKind>) {
        pretty_assertions::assert_eq!(IndexKind::from_path(Path::new(name)), expected);
    }

    #[test]
    fn test_kind_from_str() {
        pretty_assertions::assert_eq!("Index2".parse::<IndexKind>(), Ok(IndexKind::Index2));
        assert!("index3".parse::<IndexKind>().is_err());
    }

    #[test]
    fn test_archive_id_from_path() {
        let id = ArchiveId::from_path(Path::new("/game/sqpack/ffxiv/040000.win32.index"));
        pretty_assertions::assert_eq!(id.as_str(), "040000");
    }
}
