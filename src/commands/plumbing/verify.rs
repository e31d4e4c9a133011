use crate::areas::archive::Archive;
use colored::Colorize;
use std::io::Write;

impl Archive {
    pub fn verify(&mut self) -> anyhow::Result<()> {
        let index = self.store().load()?;

        match index.verify() {
            Ok(()) => {
                writeln!(self.writer(), "{} {}", "ok".green(), self.store().path().display())?;
                Ok(())
            }
            Err(error) => {
                writeln!(self.writer(), "{} {error}", "corrupt".red())?;
                Err(error)
            }
        }
    }
}
