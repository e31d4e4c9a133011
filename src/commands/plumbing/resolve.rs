use crate::areas::archive::Archive;
use std::io::Write;

impl Archive {
    pub fn resolve(&mut self, path: &str) -> anyhow::Result<()> {
        let index = self.store().load()?;

        match index.location(path) {
            Some(location) => writeln!(self.writer(), "{path}: {location}")?,
            None => anyhow::bail!("{} is not indexed in {}", path, index.archive()),
        }

        Ok(())
    }
}
