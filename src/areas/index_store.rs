//! On-disk index files
//!
//! Reads take a shared lock on the index file and writes an exclusive one,
//! so concurrent readers never observe a half-written index.

use crate::areas::index_file::IndexFile;
use crate::artifacts::index::layout::IndexLayout;
use crate::artifacts::index::{ArchiveId, IndexKind};
use anyhow::Context;
use log::info;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct IndexStore {
    /// Path to the `.index` or `.index2` file
    path: Box<Path>,
    layout: IndexLayout,
    archive: ArchiveId,
}

impl IndexStore {
    pub fn new(path: Box<Path>, layout: IndexLayout) -> Self {
        let archive = ArchiveId::from_path(&path);

        IndexStore {
            path,
            layout,
            archive,
        }
    }

    /// Open an index with the standard SqPack layout
    ///
    /// Without an explicit kind, the kind follows the file extension.
    pub fn open(path: &Path, kind: Option<IndexKind>) -> anyhow::Result<Self> {
        let kind = match kind.or_else(|| IndexKind::from_path(path)) {
            Some(kind) => kind,
            None => anyhow::bail!(
                "cannot tell the index kind of {:?}, pass it explicitly",
                path
            ),
        };

        Ok(Self::new(path.into(), IndexLayout::sqpack(kind)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &IndexLayout {
        &self.layout
    }

    pub fn archive(&self) -> &ArchiveId {
        &self.archive
    }

    pub fn load(&self) -> anyhow::Result<IndexFile> {
        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(self.path())
            .with_context(|| format!("failed to open index {:?}", self.path()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let mut bytes = Vec::new();
        lock.deref_mut().read_to_end(&mut bytes)?;

        let index = IndexFile::decode(&bytes, &self.layout, self.archive.clone())
            .with_context(|| format!("failed to decode index {:?}", self.path()))?;
        info!(
            "loaded {} with {} files from {:?}",
            self.archive,
            index.file_count(),
            self.path()
        );

        Ok(index)
    }

    pub fn save(&self, index: &mut IndexFile) -> anyhow::Result<()> {
        let bytes = index.to_bytes()?;

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())
            .with_context(|| format!("failed to create index {:?}", self.path()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        lock.deref_mut()
            .write_all(&bytes)
            .context("failed to write index")?;
        info!("saved {} bytes to {:?}", bytes.len(), self.path());

        Ok(())
    }
}
