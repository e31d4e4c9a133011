//! Core packing traits shared by every on-disk record
//!
//! Index records are fixed-width little-endian structures. `Packable` turns a
//! record into its exact on-disk bytes and `Unpackable` reads it back from a
//! reader positioned at the start of the record.

use anyhow::Result;
use bytes::Bytes;
use std::io::BufRead;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Render a byte slice as lowercase hexadecimal
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
