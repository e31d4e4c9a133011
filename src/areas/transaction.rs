//! Transactional index overlay
//!
//! `TransactionalIndex` wraps an `IndexFile` and reports every effective
//! offset change to the transaction passed into the mutating call. The
//! report carries the previous and new absolute offsets, which is enough
//! for the transaction to undo the change without re-reading the index.
//!
//! The caller owns the transaction and decides whether one is active; the
//! borrow checker guarantees a single transaction observes a given call.

use crate::areas::index_file::IndexFile;
use crate::artifacts::index::{ArchiveId, IndexKind};
use crate::artifacts::index::raw_offset::RawOffset;
use bytes::Bytes;
use derive_new::new;
use log::debug;
use std::ops::Deref;

/// One offset mutation, in absolute byte offsets
///
/// An archive has both an `.index` and an `.index2` file, so a change is
/// identified by the archive together with the kind of index it was made in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct OffsetChange {
    pub archive: ArchiveId,
    pub kind: IndexKind,
    pub path: String,
    pub previous_offset: u64,
    pub new_offset: u64,
}

/// Receiver of index offset changes
///
/// Notifications are synchronous and cannot fail back into the index; an
/// implementation should only record the change.
pub trait IndexTransaction {
    fn on_index_offset_changed(&mut self, change: OffsetChange);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionalIndex {
    index: IndexFile,
}

impl TransactionalIndex {
    pub fn new(index: IndexFile) -> Self {
        TransactionalIndex { index }
    }

    /// Point `path` at `raw_offset`, reporting the change to `transaction`
    ///
    /// Returns the previous raw offset, exactly as `IndexFile::set_data_offset`
    /// does. Nothing is reported when the offset does not change.
    pub fn set_data_offset(
        &mut self,
        path: &str,
        raw_offset: u32,
        transaction: Option<&mut dyn IndexTransaction>,
    ) -> anyhow::Result<u32> {
        let previous = self.index.set_data_offset(path, raw_offset)?;

        if let Some(transaction) = transaction
            && previous != raw_offset
        {
            let change = OffsetChange::new(
                self.index.archive().clone(),
                self.index.kind(),
                path.to_string(),
                RawOffset::new(previous).modified_offset(),
                RawOffset::new(raw_offset).modified_offset(),
            );
            debug!(
                "{} {}: {path} moved from {:#x} to {:#x}",
                change.archive, change.kind, change.previous_offset, change.new_offset
            );
            transaction.on_index_offset_changed(change);
        }

        Ok(previous)
    }

    pub fn to_bytes(&mut self) -> anyhow::Result<Bytes> {
        self.index.to_bytes()
    }

    /// Mutable access that bypasses change reporting
    pub fn untracked(&mut self) -> &mut IndexFile {
        &mut self.index
    }

    pub fn into_inner(self) -> IndexFile {
        self.index
    }
}

impl Deref for TransactionalIndex {
    type Target = IndexFile;

    fn deref(&self) -> &Self::Target {
        &self.index
    }
}

/// In-memory transaction recording offset changes in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetJournal {
    changes: Vec<OffsetChange>,
}

impl OffsetJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[OffsetChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Accept every recorded change and empty the journal
    pub fn commit(&mut self) -> Vec<OffsetChange> {
        std::mem::take(&mut self.changes)
    }

    /// Undo the changes recorded for `index`, newest first
    ///
    /// Changes made in other indexes, including the other index kind of the
    /// same archive, stay in the journal. Returns the number of changes undone.
    pub fn rollback(&mut self, index: &mut IndexFile) -> anyhow::Result<usize> {
        let (undo, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.changes)
            .into_iter()
            .partition(|change| {
                change.kind == index.kind() && &change.archive == index.archive()
            });
        self.changes = keep;

        for change in undo.iter().rev() {
            let raw_offset = u32::try_from(change.previous_offset / 8).map_err(|_| {
                anyhow::anyhow!("offset {:#x} is not a raw offset", change.previous_offset)
            })?;
            index.set_data_offset(&change.path, raw_offset)?;
        }
        debug!(
            "rolled back {} changes in {} {}",
            undo.len(),
            index.archive(),
            index.kind()
        );

        Ok(undo.len())
    }
}

impl IndexTransaction for OffsetJournal {
    fn on_index_offset_changed(&mut self, change: OffsetChange) {
        self.changes.push(change);
    }
}
