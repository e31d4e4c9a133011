use crate::areas::archive::Archive;
use crate::areas::transaction::{OffsetJournal, TransactionalIndex};
use std::io::Write;

impl Archive {
    /// Point `path` at `raw_offset` and save the index
    ///
    /// With `dry_run` the change is reported, rolled back and nothing is
    /// written.
    pub fn set_offset(&mut self, path: &str, raw_offset: u32, dry_run: bool) -> anyhow::Result<()> {
        let mut index = TransactionalIndex::new(self.store().load()?);
        let mut journal = OffsetJournal::new();

        index.set_data_offset(path, raw_offset, Some(&mut journal))?;

        if journal.is_empty() {
            writeln!(self.writer(), "{path}: unchanged")?;
            return Ok(());
        }

        for change in journal.changes() {
            writeln!(
                self.writer(),
                "{}: {:#x} -> {:#x}",
                change.path,
                change.previous_offset,
                change.new_offset
            )?;
        }

        if dry_run {
            journal.rollback(index.untracked())?;
            writeln!(self.writer(), "dry run, index left untouched")?;
            return Ok(());
        }

        let mut index = index.into_inner();
        self.store().save(&mut index)?;
        journal.commit();

        Ok(())
    }
}
