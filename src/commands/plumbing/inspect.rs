use crate::areas::archive::Archive;
use crate::artifacts::core::to_hex;
use crate::artifacts::index::layout::SegmentKind;
use std::io::Write;

impl Archive {
    pub fn inspect(&mut self) -> anyhow::Result<()> {
        let index = self.store().load()?;

        writeln!(
            self.writer(),
            "archive {} ({}), {} files",
            index.archive(),
            index.kind(),
            index.file_count()
        )?;

        for (position, segment) in index.segments().iter().enumerate() {
            let contents = match segment.contents() {
                SegmentKind::Files => "files",
                SegmentKind::Folders => "folders",
                SegmentKind::Raw => "raw",
            };

            writeln!(
                self.writer(),
                "segment {position}: {contents:<7} entries={:<6} size={:<8} sha1={}{}",
                segment.len(),
                segment.byte_size(),
                to_hex(segment.integrity_hash()),
                if segment.keep_intact() { " intact" } else { "" }
            )?;
        }

        Ok(())
    }
}
