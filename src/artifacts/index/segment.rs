//! Index segments
//!
//! A segment is a homogeneous run of fixed-size entries plus the SHA-1 of
//! their serialized bytes. Unless the segment is frozen, entries are kept in
//! ascending key order so readers can binary search them, and the hash is
//! recomputed from the sorted bytes before every write.

use crate::artifacts::index::IndexKind;
use crate::artifacts::index::checksum::{self, Sha1Hash};
use crate::artifacts::index::entry::{
    FolderSummaryEntry, FullHashEntry, IndexEntry, RawEntry, SplitHashEntry,
};
use crate::artifacts::index::error::IndexError;
use crate::artifacts::index::layout::{SegmentKind, SegmentLayout};
use bytes::Bytes;
use std::io::Cursor;

/// Entries of a segment, typed by what the segment holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEntries {
    Split(Vec<SplitHashEntry>),
    Full(Vec<FullHashEntry>),
    Folders(Vec<FolderSummaryEntry>),
    Raw(Vec<RawEntry>),
}

impl SegmentEntries {
    pub fn empty(contents: SegmentKind, kind: IndexKind) -> Self {
        match (contents, kind) {
            (SegmentKind::Files, IndexKind::Index) => SegmentEntries::Split(Vec::new()),
            (SegmentKind::Files, IndexKind::Index2) => SegmentEntries::Full(Vec::new()),
            (SegmentKind::Folders, _) => SegmentEntries::Folders(Vec::new()),
            (SegmentKind::Raw, _) => SegmentEntries::Raw(Vec::new()),
        }
    }

    pub fn contents(&self) -> SegmentKind {
        match self {
            SegmentEntries::Split(_) | SegmentEntries::Full(_) => SegmentKind::Files,
            SegmentEntries::Folders(_) => SegmentKind::Folders,
            SegmentEntries::Raw(_) => SegmentKind::Raw,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SegmentEntries::Split(entries) => entries.len(),
            SegmentEntries::Full(entries) => entries.len(),
            SegmentEntries::Folders(entries) => entries.len(),
            SegmentEntries::Raw(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sort(&mut self) {
        match self {
            SegmentEntries::Split(entries) => sort_entries(entries),
            SegmentEntries::Full(entries) => sort_entries(entries),
            SegmentEntries::Folders(entries) => sort_entries(entries),
            SegmentEntries::Raw(entries) => sort_entries(entries),
        }
    }

    fn serialize(&self) -> anyhow::Result<Bytes> {
        match self {
            SegmentEntries::Split(entries) => pack_entries(entries),
            SegmentEntries::Full(entries) => pack_entries(entries),
            SegmentEntries::Folders(entries) => pack_entries(entries),
            SegmentEntries::Raw(entries) => pack_entries(entries),
        }
    }

    fn decode(&mut self, body: &[u8], entry_size: usize) -> anyhow::Result<()> {
        match self {
            SegmentEntries::Split(entries) => *entries = unpack_entries(body, entry_size)?,
            SegmentEntries::Full(entries) => *entries = unpack_entries(body, entry_size)?,
            SegmentEntries::Folders(entries) => *entries = unpack_entries(body, entry_size)?,
            SegmentEntries::Raw(entries) => *entries = unpack_entries(body, entry_size)?,
        }

        Ok(())
    }
}

// stable, so entries with equal keys keep their insertion order
fn sort_entries<E: IndexEntry>(entries: &mut [E]) {
    entries.sort_by(|a, b| a.compare(b));
}

fn pack_entries<E: IndexEntry>(entries: &[E]) -> anyhow::Result<Bytes> {
    let mut bytes = Vec::new();
    for entry in entries {
        bytes.extend_from_slice(&entry.serialize()?);
    }

    Ok(Bytes::from(bytes))
}

fn unpack_entries<E: IndexEntry>(body: &[u8], entry_size: usize) -> anyhow::Result<Vec<E>> {
    body.chunks_exact(entry_size)
        .map(|chunk| E::deserialize(Cursor::new(chunk)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    unknown: i32,
    integrity_hash: Sha1Hash,
    keep_intact: bool,
    header_padding: u32,
    entry_size: usize,
    entries: SegmentEntries,
}

impl Segment {
    /// Create an empty segment for an index of the given kind
    pub fn new(kind: IndexKind, layout: SegmentLayout) -> Self {
        Segment {
            unknown: 0,
            integrity_hash: Sha1Hash::default(),
            keep_intact: layout.keep_intact,
            header_padding: layout.header_padding,
            entry_size: layout.kind.entry_size(kind),
            entries: SegmentEntries::empty(layout.kind, kind),
        }
    }

    /// Create a segment holding `entries`
    ///
    /// `entries` must match the layout's kind; raw entries must be exactly one
    /// entry size wide.
    pub fn with_entries(
        kind: IndexKind,
        layout: SegmentLayout,
        entries: SegmentEntries,
    ) -> anyhow::Result<Self> {
        let mut segment = Segment::new(kind, layout);
        if std::mem::discriminant(&segment.entries) != std::mem::discriminant(&entries) {
            anyhow::bail!(
                "{:?} entries cannot live in a {:?} segment of an {} file",
                entries.contents(),
                layout.kind,
                kind
            );
        }
        if let SegmentEntries::Raw(raw) = &entries
            && raw.iter().any(|entry| entry.bytes.len() != segment.entry_size)
        {
            anyhow::bail!("raw entries must be {} bytes wide", segment.entry_size);
        }

        segment.entries = entries;
        Ok(segment)
    }

    pub(crate) fn decode(
        position: usize,
        kind: IndexKind,
        layout: SegmentLayout,
        unknown: i32,
        integrity_hash: Sha1Hash,
        body: &[u8],
    ) -> anyhow::Result<Self> {
        let mut segment = Segment::new(kind, layout);
        if body.len() % segment.entry_size != 0 {
            return Err(IndexError::MisalignedSegment {
                segment: position,
                size: body.len(),
                entry_size: segment.entry_size,
            }
            .into());
        }

        segment.unknown = unknown;
        segment.integrity_hash = integrity_hash;
        segment.entries.decode(body, segment.entry_size)?;
        segment.sort();

        Ok(segment)
    }

    pub fn with_unknown(mut self, unknown: i32) -> Self {
        self.unknown = unknown;
        self
    }

    pub fn unknown(&self) -> i32 {
        self.unknown
    }

    pub fn integrity_hash(&self) -> &Sha1Hash {
        &self.integrity_hash
    }

    pub fn keep_intact(&self) -> bool {
        self.keep_intact
    }

    pub fn header_padding(&self) -> u32 {
        self.header_padding
    }

    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    pub fn entries(&self) -> &SegmentEntries {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut SegmentEntries {
        &mut self.entries
    }

    pub fn contents(&self) -> SegmentKind {
        self.entries.contents()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.entries.len() * self.entry_size
    }

    pub fn sort(&mut self) {
        if self.keep_intact {
            return;
        }

        self.entries.sort();
    }

    pub fn serialize_entries(&self) -> anyhow::Result<Bytes> {
        self.entries.serialize()
    }

    /// Recompute the integrity hash, optionally from already serialized entries
    ///
    /// Must run after `sort`, otherwise the hash covers an order readers
    /// will never see.
    pub fn recalculate_hash(&mut self, precomputed: Option<&[u8]>) -> anyhow::Result<()> {
        if self.keep_intact {
            return Ok(());
        }

        self.integrity_hash = match precomputed {
            Some(bytes) => checksum::sha1(bytes),
            None => checksum::sha1(&self.serialize_entries()?),
        };

        Ok(())
    }

    /// Check the stored hash against the current entry bytes
    pub fn verify_hash(&self) -> anyhow::Result<bool> {
        Ok(checksum::sha1(&self.serialize_entries()?) == self.integrity_hash)
    }
}
