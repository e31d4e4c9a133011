use anyhow::Result;
use clap::{Parser, Subcommand};
use sqindex::areas::archive::Archive;
use sqindex::artifacts::index::IndexKind;

#[derive(Parser)]
#[command(
    name = "sqindex",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Inspect and update archive index files",
    long_about = "This tool reads the sorted, checksummed index files that map asset paths \
    to offsets inside sharded data files. It can verify their integrity, resolve paths \
    and repoint them, rewriting every checksum on save.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Index kind (index or index2), detected from the extension by default"
    )]
    kind: Option<IndexKind>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "inspect",
        about = "Print the segment table of an index",
        long_about = "This command prints the archive id, the number of indexed files \
        and the size and checksum of every segment."
    )]
    Inspect {
        #[arg(index = 1, help = "The index file")]
        file: String,
    },
    #[command(
        name = "resolve",
        about = "Print where a path's data lives",
        long_about = "This command hashes the path, looks it up and prints its raw offset \
        together with the decoded shard number and data offset."
    )]
    Resolve {
        #[arg(index = 1, help = "The index file")]
        file: String,
        #[arg(index = 2, help = "The game path to look up")]
        path: String,
    },
    #[command(
        name = "set-offset",
        about = "Point a path at a new raw offset",
        long_about = "This command sets the raw offset of a path, inserting the path when it \
        is missing and removing it when the offset is 0, then rewrites the index."
    )]
    SetOffset {
        #[arg(index = 1, help = "The index file")]
        file: String,
        #[arg(index = 2, help = "The game path to update")]
        path: String,
        #[arg(index = 3, value_parser = parse_raw_offset, help = "The raw offset, decimal or 0x-prefixed hex")]
        raw_offset: u32,
        #[arg(long, help = "Report the change without writing the index")]
        dry_run: bool,
    },
    #[command(
        name = "verify",
        about = "Check every checksum of an index",
        long_about = "This command checks the header, the segment header block and every \
        segment against their stored SHA-1 values."
    )]
    Verify {
        #[arg(index = 1, help = "The index file")]
        file: String,
    },
}

fn parse_raw_offset(value: &str) -> Result<u32, std::num::ParseIntError> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Inspect { file } => {
            let mut archive = Archive::new(file, cli.kind, Box::new(std::io::stdout()))?;
            archive.inspect()?
        }
        Commands::Resolve { file, path } => {
            let mut archive = Archive::new(file, cli.kind, Box::new(std::io::stdout()))?;
            archive.resolve(path)?
        }
        Commands::SetOffset {
            file,
            path,
            raw_offset,
            dry_run,
        } => {
            let mut archive = Archive::new(file, cli.kind, Box::new(std::io::stdout()))?;
            archive.set_offset(path, *raw_offset, *dry_run)?
        }
        Commands::Verify { file } => {
            let mut archive = Archive::new(file, cli.kind, Box::new(std::io::stdout()))?;
            archive.verify()?
        }
    }

    Ok(())
}
