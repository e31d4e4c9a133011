//! Archive index file
//!
//! An `IndexFile` owns the opaque header, the segment header block and the
//! decoded segments of one `.index` or `.index2` file. Lookups hash a path
//! and binary search the file entry segment; `to_bytes` lays the file out
//! again, re-sorting and re-hashing every segment that is not frozen.
//!
//! ## Serialization
//!
//! 1. Sort every segment and rebuild folder summaries from the file entries
//! 2. Assign body offsets sequentially after the segment header block, with
//!    empty segments recorded at offset 0
//! 3. Serialize each segment, hash those bytes, and write its header record
//!    at a cursor advanced by the record size plus the segment's padding
//! 4. Seal the segment header block and the header with their SHA-1 slots

use crate::artifacts::index::checksum;
use crate::artifacts::index::entry::{
    FolderSummaryEntry, IndexEntry, OffsetEntry, SplitHashEntry,
};
use crate::artifacts::index::error::IndexError;
use crate::artifacts::index::layout::{self, IndexLayout, SegmentKind};
use crate::artifacts::index::raw_offset::RawOffset;
use crate::artifacts::index::segment::{Segment, SegmentEntries};
use crate::artifacts::index::{
    ArchiveId, BLOCK_SIZE_FIELD, CHECKSUM_SIZE, HASH_SLOT_SIZE, IndexKind, SEGMENT_RECORD_SIZE,
    SPLIT_ENTRY_SIZE, SQPACK_SEGMENT_HEADER_BLOCK_SIZE,
};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use bytes::Bytes;
use log::{debug, trace};
use std::io::Write;

/// SqPack magic at the start of an index header
const SQPACK_MAGIC: &[u8; 6] = b"SqPack";

/// Header field holding the header size
const HEADER_SIZE_FIELD: usize = 0x0C;

/// Header field holding the SqPack file type
const FILE_TYPE_FIELD: usize = 0x14;

/// SqPack file type of index files
const INDEX_FILE_TYPE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFile {
    kind: IndexKind,
    archive: ArchiveId,
    header: Vec<u8>,
    segment_headers: Vec<u8>,
    segments: Vec<Segment>,
}

impl IndexFile {
    /// Create an empty index with the standard SqPack layout
    pub fn new(kind: IndexKind, archive: ArchiveId) -> Self {
        let layout = IndexLayout::sqpack(kind);

        let mut header = vec![0u8; layout.header_size];
        header[..SQPACK_MAGIC.len()].copy_from_slice(SQPACK_MAGIC);
        LittleEndian::write_u32(
            &mut header[HEADER_SIZE_FIELD..HEADER_SIZE_FIELD + 4],
            layout.header_size as u32,
        );
        LittleEndian::write_u32(
            &mut header[FILE_TYPE_FIELD..FILE_TYPE_FIELD + 4],
            INDEX_FILE_TYPE,
        );

        let segments = layout
            .segments
            .iter()
            .map(|segment| Segment::new(kind, *segment))
            .collect();

        IndexFile {
            kind,
            archive,
            header,
            segment_headers: vec![0u8; SQPACK_SEGMENT_HEADER_BLOCK_SIZE],
            segments,
        }
    }

    /// Assemble an index from an explicit header and segments
    ///
    /// The segment header block is zero filled; it must be large enough for
    /// every segment's header record, its padding and the trailing hash slot.
    /// Segments that are not frozen are sorted so lookups can binary search.
    pub fn from_parts(
        kind: IndexKind,
        archive: ArchiveId,
        header: Vec<u8>,
        segment_header_block_size: usize,
        mut segments: Vec<Segment>,
    ) -> anyhow::Result<Self> {
        if header.len() < HASH_SLOT_SIZE {
            return Err(IndexError::HeaderTooSmall(header.len()).into());
        }

        let required = layout::min_block_size(segments.iter().map(Segment::header_padding));
        if segment_header_block_size < required {
            return Err(IndexError::HeaderBlockOverrun {
                required,
                block_size: segment_header_block_size,
            }
            .into());
        }

        for segment in &mut segments {
            segment.sort();
        }

        Ok(IndexFile {
            kind,
            archive,
            header,
            segment_headers: vec![0u8; segment_header_block_size],
            segments,
        })
    }

    /// Decode an index file
    ///
    /// Every byte must be accounted for: segments have to sit back to back
    /// right after the segment header block and end exactly at the end of
    /// `bytes`.
    pub fn decode(bytes: &[u8], layout: &IndexLayout, archive: ArchiveId) -> anyhow::Result<Self> {
        let header_size = layout.header_size;
        if header_size < HASH_SLOT_SIZE {
            return Err(IndexError::HeaderTooSmall(header_size).into());
        }

        let header = read_slice(bytes, 0, header_size)?.to_vec();
        let block_size =
            LittleEndian::read_u32(read_slice(bytes, header_size, BLOCK_SIZE_FIELD)?) as usize;

        let required = layout.min_segment_header_block_size();
        if block_size < required {
            return Err(IndexError::HeaderBlockOverrun {
                required,
                block_size,
            }
            .into());
        }
        let segment_headers = read_slice(bytes, header_size, block_size)?.to_vec();

        let mut segments = Vec::with_capacity(layout.segments.len());
        let mut expected_offset = header_size + block_size;
        let mut cursor = BLOCK_SIZE_FIELD;

        for (position, segment_layout) in layout.segments.iter().enumerate() {
            let record = &segment_headers[cursor..cursor + SEGMENT_RECORD_SIZE];
            let unknown = LittleEndian::read_i32(&record[0..4]);
            let offset = LittleEndian::read_u32(&record[4..8]) as usize;
            let size = LittleEndian::read_u32(&record[8..12]) as usize;
            let mut integrity_hash = [0u8; CHECKSUM_SIZE];
            integrity_hash.copy_from_slice(&record[12..12 + CHECKSUM_SIZE]);

            let body = if size == 0 {
                &[][..]
            } else {
                if offset != expected_offset {
                    return Err(IndexError::SegmentOffsetMismatch {
                        segment: position,
                        declared: offset,
                        expected: expected_offset,
                    }
                    .into());
                }
                read_slice(bytes, offset, size)?
            };

            let segment = Segment::decode(
                position,
                layout.kind,
                *segment_layout,
                unknown,
                integrity_hash,
                body,
            )?;
            trace!(
                "decoded segment {position}: {} entries at {offset:#x}",
                segment.len()
            );

            segments.push(segment);
            expected_offset += size;
            cursor += SEGMENT_RECORD_SIZE + segment_layout.header_padding as usize;
        }

        if expected_offset != bytes.len() {
            return Err(IndexError::LengthMismatch {
                expected: expected_offset,
                actual: bytes.len(),
            }
            .into());
        }

        debug!(
            "decoded {} {archive} with {} segments",
            layout.kind,
            segments.len()
        );

        Ok(IndexFile {
            kind: layout.kind,
            archive,
            header,
            segment_headers,
            segments,
        })
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn archive(&self) -> &ArchiveId {
        &self.archive
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn segment_header_block_size(&self) -> usize {
        self.segment_headers.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, position: usize) -> Option<&Segment> {
        self.segments.get(position)
    }

    /// Number of file entries
    pub fn file_count(&self) -> usize {
        self.file_segment_position()
            .map(|position| self.segments[position].len())
            .unwrap_or_default()
    }

    /// Raw offset a path resolves to, if the path is indexed
    pub fn data_offset(&self, path: &str) -> Option<u32> {
        let position = self.file_segment_position()?;
        let segment = &self.segments[position];

        let found = match segment.entries() {
            SegmentEntries::Split(entries) => find_offset(entries, path, segment.keep_intact()),
            SegmentEntries::Full(entries) => find_offset(entries, path, segment.keep_intact()),
            _ => None,
        };
        if found.is_none() {
            trace!("{path} is not indexed in {}", self.archive);
        }

        found
    }

    /// Decoded location a path resolves to, if the path is indexed
    pub fn location(&self, path: &str) -> Option<RawOffset> {
        self.data_offset(path).map(RawOffset::new)
    }

    /// Point `path` at `raw_offset` and return the previous raw offset
    ///
    /// A missing path is inserted at its sorted position and reports a
    /// previous offset of 0. Setting an offset of 0 removes the entry.
    pub fn set_data_offset(&mut self, path: &str, raw_offset: u32) -> anyhow::Result<u32> {
        let position = self
            .file_segment_position()
            .ok_or(IndexError::MissingFileSegment)?;
        let segment = &mut self.segments[position];
        if segment.keep_intact() {
            return Err(IndexError::FrozenSegment(position).into());
        }

        let previous = match segment.entries_mut() {
            SegmentEntries::Split(entries) => update_offset(entries, path, raw_offset),
            SegmentEntries::Full(entries) => update_offset(entries, path, raw_offset),
            _ => return Err(IndexError::MissingFileSegment.into()),
        };
        trace!("{path}: {previous:#x} -> {raw_offset:#x}");

        Ok(previous)
    }

    /// Lay the file out and return its bytes
    ///
    /// Sorts and re-hashes the segments and refreshes the stored header
    /// records and hash slots, so a file verifies after it has been written.
    pub fn to_bytes(&mut self) -> anyhow::Result<Bytes> {
        for segment in &mut self.segments {
            segment.sort();
        }
        self.rebuild_folder_summaries();

        let header_size = self.header.len();
        let body_start = header_size + self.segment_headers.len();

        let mut offsets = Vec::with_capacity(self.segments.len());
        let mut next_offset = body_start;
        for segment in &self.segments {
            let size = segment.byte_size();
            offsets.push(if size == 0 { 0 } else { next_offset });
            next_offset += size;
        }
        self.place_folder_summaries(&offsets)?;

        let mut output = vec![0u8; next_offset];
        let block_size = self.segment_headers.len();
        let mut cursor = BLOCK_SIZE_FIELD;

        for (position, (segment, &offset)) in self.segments.iter_mut().zip(&offsets).enumerate() {
            let body = segment.serialize_entries()?;
            if body.len() != segment.byte_size() {
                return Err(IndexError::MisalignedSegment {
                    segment: position,
                    size: body.len(),
                    entry_size: segment.entry_size(),
                }
                .into());
            }
            segment.recalculate_hash(Some(&body))?;

            let record = self
                .segment_headers
                .get_mut(cursor..cursor + SEGMENT_RECORD_SIZE)
                .ok_or(IndexError::HeaderBlockOverrun {
                    required: cursor + SEGMENT_RECORD_SIZE,
                    block_size,
                })?;
            write_record(record, segment, offset)?;
            cursor += SEGMENT_RECORD_SIZE + segment.header_padding() as usize;

            output[offset..offset + body.len()].copy_from_slice(&body);
            debug!(
                "segment {position}: {} entries, {} bytes at {offset:#x}",
                segment.len(),
                body.len()
            );
        }

        LittleEndian::write_u32(
            &mut self.segment_headers[..BLOCK_SIZE_FIELD],
            to_u32(block_size)?,
        );
        checksum::seal(&mut self.segment_headers)?;
        checksum::seal(&mut self.header)?;

        output[..header_size].copy_from_slice(&self.header);
        output[header_size..body_start].copy_from_slice(&self.segment_headers);

        Ok(Bytes::from(output))
    }

    /// Check the header, the segment header block and every segment that is
    /// not frozen against their stored SHA-1 values
    ///
    /// Frozen segments carry their stored hash through untouched, so there is
    /// nothing to check it against.
    pub fn verify(&self) -> anyhow::Result<()> {
        if !checksum::verify_sealed(&self.header)? {
            return Err(IndexError::ChecksumMismatch("header".to_string()).into());
        }
        if !checksum::verify_sealed(&self.segment_headers)? {
            return Err(IndexError::ChecksumMismatch("segment header block".to_string()).into());
        }

        for (position, segment) in self.segments.iter().enumerate() {
            if segment.keep_intact() {
                continue;
            }
            if !segment.verify_hash()? {
                return Err(IndexError::ChecksumMismatch(format!("segment {position}")).into());
            }
        }

        Ok(())
    }

    fn file_segment_position(&self) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| segment.contents() == SegmentKind::Files)
    }

    fn folder_segment_position(&self) -> Option<usize> {
        self.segments.iter().position(|segment| {
            segment.contents() == SegmentKind::Folders && !segment.keep_intact()
        })
    }

    fn split_entries(&self) -> Option<&[SplitHashEntry]> {
        match self.segments[self.file_segment_position()?].entries() {
            SegmentEntries::Split(entries) => Some(entries),
            _ => None,
        }
    }

    /// Regenerate one summary per folder, with offsets relative to the start
    /// of the file entry segment
    fn rebuild_folder_summaries(&mut self) {
        let Some(folder_position) = self.folder_segment_position() else {
            return;
        };
        let Some(files) = self.split_entries() else {
            return;
        };

        let mut summaries: Vec<FolderSummaryEntry> = Vec::new();
        for (idx, entry) in files.iter().enumerate() {
            match summaries.last_mut() {
                Some(last) if last.folder_hash == entry.folder_hash => {
                    last.entries_size += SPLIT_ENTRY_SIZE as u32;
                }
                _ => summaries.push(FolderSummaryEntry::new(
                    entry.folder_hash,
                    (idx * SPLIT_ENTRY_SIZE) as u32,
                    SPLIT_ENTRY_SIZE as u32,
                )),
            }
        }

        if let SegmentEntries::Folders(existing) = self.segments[folder_position].entries_mut() {
            for summary in &mut summaries {
                if let Ok(found) = existing.binary_search_by(|e| e.key().cmp(&summary.key())) {
                    summary.reserved = existing[found].reserved;
                }
            }
            *existing = summaries;
        }
    }

    fn place_folder_summaries(&mut self, offsets: &[usize]) -> anyhow::Result<()> {
        let (Some(folder_position), Some(file_position)) =
            (self.folder_segment_position(), self.file_segment_position())
        else {
            return Ok(());
        };
        if self.split_entries().is_none() {
            return Ok(());
        }

        let base = to_u32(offsets[file_position])?;
        if let SegmentEntries::Folders(summaries) = self.segments[folder_position].entries_mut() {
            for summary in summaries {
                summary.entries_offset = summary
                    .entries_offset
                    .checked_add(base)
                    .ok_or(IndexError::OffsetOverflow(offsets[file_position]))?;
            }
        }

        Ok(())
    }
}

fn find_offset<E: OffsetEntry>(entries: &[E], path: &str, unsorted: bool) -> Option<u32> {
    let probe = E::for_path(path, 0);
    let found = if unsorted {
        entries.iter().position(|entry| entry.compare(&probe).is_eq())
    } else {
        entries.binary_search_by(|entry| entry.compare(&probe)).ok()
    };

    found.map(|idx| entries[idx].raw_offset())
}

fn update_offset<E: OffsetEntry>(entries: &mut Vec<E>, path: &str, raw_offset: u32) -> u32 {
    let probe = E::for_path(path, raw_offset);

    match entries.binary_search_by(|entry| entry.compare(&probe)) {
        Ok(idx) => {
            let previous = entries[idx].raw_offset();
            if raw_offset == 0 {
                entries.remove(idx);
            } else {
                entries[idx].set_raw_offset(raw_offset);
            }
            previous
        }
        Err(idx) => {
            if raw_offset != 0 {
                entries.insert(idx, probe);
            }
            0
        }
    }
}

fn write_record(record: &mut [u8], segment: &Segment, offset: usize) -> anyhow::Result<()> {
    let mut writer = std::io::Cursor::new(record);
    writer.write_i32::<LittleEndian>(segment.unknown())?;
    writer.write_u32::<LittleEndian>(to_u32(offset)?)?;
    writer.write_u32::<LittleEndian>(to_u32(segment.byte_size())?)?;
    writer.write_all(segment.integrity_hash())?;

    Ok(())
}

fn read_slice(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], IndexError> {
    bytes
        .get(offset..offset.saturating_add(len))
        .ok_or(IndexError::Truncated {
            offset,
            needed: len,
            available: bytes.len().saturating_sub(offset),
        })
}

fn to_u32(value: usize) -> Result<u32, IndexError> {
    u32::try_from(value).map_err(|_| IndexError::OffsetOverflow(value))
}
