//! Decode layouts
//!
//! The file itself records segment offsets, sizes and hashes, but not what a
//! segment contains, how much padding follows its header record, or whether
//! it must be kept byte for byte. A layout supplies that knowledge.

use crate::artifacts::index::{
    BLOCK_SIZE_FIELD, FOLDER_ENTRY_SIZE, HASH_SLOT_SIZE, IndexKind, SEGMENT_RECORD_SIZE,
    SQPACK_HEADER_SIZE,
};
use derive_new::new;

/// What a segment contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Hashed file entries of the index kind
    Files,
    /// Folder summaries over the file entries (`.index` only)
    Folders,
    /// Opaque records kept in source order
    Raw,
}

impl SegmentKind {
    pub fn entry_size(self, kind: IndexKind) -> usize {
        match self {
            SegmentKind::Folders => FOLDER_ENTRY_SIZE,
            SegmentKind::Files | SegmentKind::Raw => kind.entry_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct SegmentLayout {
    pub kind: SegmentKind,
    /// Bytes between this segment's header record and the next one
    pub header_padding: u32,
    /// Preserve order and hash verbatim
    pub keep_intact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexLayout {
    pub kind: IndexKind,
    pub header_size: usize,
    pub segments: Vec<SegmentLayout>,
}

impl IndexLayout {
    /// Standard SqPack layout: 1024-byte header, four segments
    pub fn sqpack(kind: IndexKind) -> Self {
        let last = match kind {
            IndexKind::Index => SegmentLayout::new(SegmentKind::Folders, 40, false),
            IndexKind::Index2 => SegmentLayout::new(SegmentKind::Raw, 40, true),
        };

        IndexLayout {
            kind,
            header_size: SQPACK_HEADER_SIZE,
            segments: vec![
                SegmentLayout::new(SegmentKind::Files, 44, false),
                SegmentLayout::new(SegmentKind::Raw, 40, true),
                SegmentLayout::new(SegmentKind::Raw, 40, true),
                last,
            ],
        }
    }

    /// Smallest segment header block that fits every record and the hash slot
    pub fn min_segment_header_block_size(&self) -> usize {
        min_block_size(self.segments.iter().map(|segment| segment.header_padding))
    }
}

pub(crate) fn min_block_size(paddings: impl Iterator<Item = u32>) -> usize {
    let records: usize = paddings
        .map(|padding| SEGMENT_RECORD_SIZE + padding as usize)
        .sum();

    BLOCK_SIZE_FIELD + records + HASH_SLOT_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::SQPACK_SEGMENT_HEADER_BLOCK_SIZE;

    #[test]
    fn test_sqpack_records_fit_their_block() {
        let layout = IndexLayout::sqpack(IndexKind::Index);

        pretty_assertions::assert_eq!(layout.min_segment_header_block_size(), 4 + 292 + 64);
        assert!(layout.min_segment_header_block_size() <= SQPACK_SEGMENT_HEADER_BLOCK_SIZE);
    }

    #[test]
    fn test_only_index_has_folder_segment() {
        let index = IndexLayout::sqpack(IndexKind::Index);
        let index2 = IndexLayout::sqpack(IndexKind::Index2);

        pretty_assertions::assert_eq!(index.segments[3].kind, SegmentKind::Folders);
        assert!(index2.segments.iter().all(|s| s.kind != SegmentKind::Folders));
    }

    #[test]
    fn test_entry_sizes() {
        pretty_assertions::assert_eq!(SegmentKind::Files.entry_size(IndexKind::Index2), 8);
        pretty_assertions::assert_eq!(SegmentKind::Raw.entry_size(IndexKind::Index), 16);
        pretty_assertions::assert_eq!(SegmentKind::Folders.entry_size(IndexKind::Index2), 16);
    }
}
