//! Encoded data offsets
//!
//! A raw offset packs two things into one `u32`: the byte position inside a
//! data shard, scaled down by 8, and the shard number in bits 1..=3. Data is
//! aligned to 128 bytes, so the low bits of the scaled position are free.
//!
//! ```text
//! modified_offset = raw * 8
//! shard_number    = (raw & 0xF) / 2
//! data_offset     = (modified_offset / 128) * 128
//! ```

use crate::artifacts::index::error::IndexError;
use std::fmt;

/// Data is stored on 128-byte boundaries
pub const DATA_ALIGNMENT: u64 = 128;

/// Highest shard number the low nibble can carry
pub const MAX_SHARD: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RawOffset(u32);

impl RawOffset {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// A raw offset of zero marks an absent entry
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Absolute byte offset, shard bits included
    pub const fn modified_offset(self) -> u64 {
        self.0 as u64 * 8
    }

    pub const fn shard_number(self) -> u8 {
        ((self.0 & 0xF) / 2) as u8
    }

    /// Byte offset of the data block inside its shard
    pub const fn data_offset(self) -> u64 {
        (self.modified_offset() / DATA_ALIGNMENT) * DATA_ALIGNMENT
    }

    /// Encode a shard number and an aligned data offset
    pub fn from_location(shard: u8, data_offset: u64) -> Result<Self, IndexError> {
        if shard > MAX_SHARD {
            return Err(IndexError::InvalidShard(shard));
        }
        if data_offset % DATA_ALIGNMENT != 0 {
            return Err(IndexError::InvalidDataOffset(data_offset));
        }

        let scaled = u32::try_from(data_offset / 8)
            .map_err(|_| IndexError::InvalidDataOffset(data_offset))?;

        Ok(Self(scaled | (shard as u32 * 2)))
    }
}

impl From<u32> for RawOffset {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<RawOffset> for u32 {
    fn from(offset: RawOffset) -> Self {
        offset.0
    }
}

impl fmt::Display for RawOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#010x} (shard {}, offset {:#x})",
            self.0,
            self.shard_number(),
            self.data_offset()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_decode_small_offset() {
        let offset = RawOffset::new(0x11);

        pretty_assertions::assert_eq!(offset.modified_offset(), 136);
        pretty_assertions::assert_eq!(offset.shard_number(), 0);
        pretty_assertions::assert_eq!(offset.data_offset(), 128);
    }

    #[test]
    fn test_decode_max_offset_does_not_overflow() {
        let offset = RawOffset::new(u32::MAX);

        pretty_assertions::assert_eq!(offset.modified_offset(), u32::MAX as u64 * 8);
        pretty_assertions::assert_eq!(offset.shard_number(), 7);
        pretty_assertions::assert_eq!(offset.data_offset() % DATA_ALIGNMENT, 0);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(1, 0x80, 0x12)]
    #[case(3, 0x1_0000, 0x2006)]
    #[case(7, 0x80, 0x1E)]
    fn test_encode_location(#[case] shard: u8, #[case] data_offset: u64, #[case] raw: u32) {
        pretty_assertions::assert_eq!(
            RawOffset::from_location(shard, data_offset),
            Ok(RawOffset::new(raw))
        );
    }

    #[test]
    fn test_encode_rejects_bad_locations() {
        pretty_assertions::assert_eq!(
            RawOffset::from_location(8, 0),
            Err(IndexError::InvalidShard(8))
        );
        pretty_assertions::assert_eq!(
            RawOffset::from_location(0, 0x81),
            Err(IndexError::InvalidDataOffset(0x81))
        );
        assert!(RawOffset::from_location(0, 1 << 40).is_err());
    }

    proptest! {
        #[test]
        fn prop_location_survives_encoding(shard in 0u8..=MAX_SHARD, block in 0u64..(1 << 28)) {
            let data_offset = block * DATA_ALIGNMENT;
            let offset = RawOffset::from_location(shard, data_offset).unwrap();

            prop_assert_eq!(offset.shard_number(), shard);
            prop_assert_eq!(offset.data_offset(), data_offset);
        }
    }
}
