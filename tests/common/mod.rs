#![allow(dead_code)]

use sqindex::areas::index_file::IndexFile;
use sqindex::artifacts::index::{ArchiveId, IndexKind};
use std::path::Path;

pub const PATHS: [&str; 4] = [
    "chara/equipment/e0100/model/c0101e0100_top.mdl",
    "chara/equipment/e0100/e0100.imc",
    "exd/root.exl",
    "ui/icon/000000/000001.tex",
];

/// Write an index holding `PATHS` at raw offsets 0x10, 0x20, ...
pub fn write_index(path: &Path, kind: IndexKind) -> anyhow::Result<Vec<u8>> {
    let mut index = IndexFile::new(kind, ArchiveId::from_path(path));
    for (i, game_path) in PATHS.iter().enumerate() {
        index.set_data_offset(game_path, 0x10 * (i as u32 + 1))?;
    }

    let bytes = index.to_bytes()?.to_vec();
    std::fs::write(path, &bytes)?;

    Ok(bytes)
}

// Helper function to create hexdump representation
pub fn to_hexdump(data: &[u8]) -> String {
    let mut result = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        result.push_str(&format!("{:08x}: ", i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                result.push(' ');
            }
            result.push_str(&format!("{:02x} ", byte));
        }

        result.push('\n');
    }
    result
}

// Macro to compare index contents with hexdump output on failure
#[macro_export]
macro_rules! assert_index_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            pretty_assertions::assert_eq!(
                common::to_hexdump($left),
                common::to_hexdump($right),
                "\n=== INDEX CONTENTS DIFFER ===\n({} bytes vs {} bytes)",
                $left.len(),
                $right.len()
            );
        }
    };
}
