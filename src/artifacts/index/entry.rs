//! Index entry representation
//!
//! Every segment holds a homogeneous run of one of four record types:
//!
//! - `SplitHashEntry`: `.index` file entry keyed by folder and file name hash
//! - `FullHashEntry`: `.index2` file entry keyed by the full path hash
//! - `FolderSummaryEntry`: range of `.index` file entries sharing a folder
//! - `RawEntry`: opaque record kept in source order
//!
//! ## Entry Format
//!
//! ```text
//! SplitHashEntry     [file_hash:u32][folder_hash:u32][raw_offset:u32][reserved:u32]
//! FullHashEntry      [path_hash:u32][raw_offset:u32]
//! FolderSummaryEntry [folder_hash:u32][entries_offset:u32][entries_size:u32][reserved:u32]
//! ```
//!
//! Hashes are raw CRC bits and always compare as unsigned integers.

use crate::artifacts::core::{Packable, Unpackable};
use crate::artifacts::index::path_hash;
use crate::artifacts::index::raw_offset::RawOffset;
use crate::artifacts::index::{FOLDER_ENTRY_SIZE, FULL_ENTRY_SIZE, SPLIT_ENTRY_SIZE};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::io::{BufRead, Read};

/// A record stored in a segment
///
/// Comparison is only defined between records of the same type, so a segment
/// can never be asked to order two different variants.
pub trait IndexEntry: Packable + Unpackable + Clone + Debug + PartialEq {
    /// Sort key of the record
    type Key: Ord + Copy + Debug;

    fn key(&self) -> Self::Key;

    fn compare(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A record that points into a data shard
pub trait OffsetEntry: IndexEntry {
    /// Build the entry a path resolves to, pointing at `raw_offset`
    fn for_path(path: &str, raw_offset: u32) -> Self;

    fn raw_offset(&self) -> u32;

    fn set_raw_offset(&mut self, raw_offset: u32);

    fn location(&self) -> RawOffset {
        RawOffset::new(self.raw_offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, new)]
pub struct SplitHashEntry {
    pub file_hash: u32,
    pub folder_hash: u32,
    pub raw_offset: u32,
    #[new(default)]
    pub reserved: u32,
}

impl IndexEntry for SplitHashEntry {
    type Key = (u32, u32);

    fn key(&self) -> Self::Key {
        (self.folder_hash, self.file_hash)
    }
}

impl OffsetEntry for SplitHashEntry {
    fn for_path(path: &str, raw_offset: u32) -> Self {
        let (folder_hash, file_hash) = path_hash::split_hashes(path);
        SplitHashEntry::new(file_hash, folder_hash, raw_offset)
    }

    fn raw_offset(&self) -> u32 {
        self.raw_offset
    }

    fn set_raw_offset(&mut self, raw_offset: u32) {
        self.raw_offset = raw_offset;
    }
}

impl Packable for SplitHashEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(SPLIT_ENTRY_SIZE);
        bytes.write_u32::<LittleEndian>(self.file_hash)?;
        bytes.write_u32::<LittleEndian>(self.folder_hash)?;
        bytes.write_u32::<LittleEndian>(self.raw_offset)?;
        bytes.write_u32::<LittleEndian>(self.reserved)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for SplitHashEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        Ok(SplitHashEntry {
            file_hash: reader.read_u32::<LittleEndian>()?,
            folder_hash: reader.read_u32::<LittleEndian>()?,
            raw_offset: reader.read_u32::<LittleEndian>()?,
            reserved: reader.read_u32::<LittleEndian>()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, new)]
pub struct FullHashEntry {
    pub path_hash: u32,
    pub raw_offset: u32,
}

impl IndexEntry for FullHashEntry {
    type Key = u32;

    fn key(&self) -> Self::Key {
        self.path_hash
    }
}

impl OffsetEntry for FullHashEntry {
    fn for_path(path: &str, raw_offset: u32) -> Self {
        FullHashEntry::new(path_hash::full_hash(path), raw_offset)
    }

    fn raw_offset(&self) -> u32 {
        self.raw_offset
    }

    fn set_raw_offset(&mut self, raw_offset: u32) {
        self.raw_offset = raw_offset;
    }
}

impl Packable for FullHashEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(FULL_ENTRY_SIZE);
        bytes.write_u32::<LittleEndian>(self.path_hash)?;
        bytes.write_u32::<LittleEndian>(self.raw_offset)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for FullHashEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        Ok(FullHashEntry {
            path_hash: reader.read_u32::<LittleEndian>()?,
            raw_offset: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// Range of `.index` file entries that live in one folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, new)]
pub struct FolderSummaryEntry {
    pub folder_hash: u32,
    /// Absolute offset of the folder's first file entry
    pub entries_offset: u32,
    pub entries_size: u32,
    #[new(default)]
    pub reserved: u32,
}

impl FolderSummaryEntry {
    pub fn file_count(&self) -> u32 {
        self.entries_size / SPLIT_ENTRY_SIZE as u32
    }
}

impl IndexEntry for FolderSummaryEntry {
    type Key = u32;

    fn key(&self) -> Self::Key {
        self.folder_hash
    }
}

impl Packable for FolderSummaryEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(FOLDER_ENTRY_SIZE);
        bytes.write_u32::<LittleEndian>(self.folder_hash)?;
        bytes.write_u32::<LittleEndian>(self.entries_offset)?;
        bytes.write_u32::<LittleEndian>(self.entries_size)?;
        bytes.write_u32::<LittleEndian>(self.reserved)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for FolderSummaryEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        Ok(FolderSummaryEntry {
            folder_hash: reader.read_u32::<LittleEndian>()?,
            entries_offset: reader.read_u32::<LittleEndian>()?,
            entries_size: reader.read_u32::<LittleEndian>()?,
            reserved: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// Opaque record passed through unchanged
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, new)]
pub struct RawEntry {
    pub bytes: Bytes,
}

impl IndexEntry for RawEntry {
    type Key = ();

    fn key(&self) -> Self::Key {}
}

impl Packable for RawEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(self.bytes.clone())
    }
}

impl Unpackable for RawEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        Ok(RawEntry {
            bytes: Bytes::from(bytes),
        })
    }
}
