//! Structural failures of the index codec
//!
//! Every variant is fatal: the codec never retries and never repairs an
//! archive it cannot account for byte for byte.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("index truncated: {needed} bytes needed at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("header of {0} bytes cannot hold its 64-byte hash slot")]
    HeaderTooSmall(usize),

    #[error("segment header records need {required} bytes but the block holds {block_size}")]
    HeaderBlockOverrun { required: usize, block_size: usize },

    #[error("segment {segment}: size {size} is not a multiple of entry size {entry_size}")]
    MisalignedSegment {
        segment: usize,
        size: usize,
        entry_size: usize,
    },

    #[error("segment {segment}: declared at offset {declared}, layout expects {expected}")]
    SegmentOffsetMismatch {
        segment: usize,
        declared: usize,
        expected: usize,
    },

    #[error("index is {actual} bytes but its layout accounts for {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("offset {0} does not fit in a 32-bit segment header field")]
    OffsetOverflow(usize),

    #[error("{0} checksum does not match value stored on disk")]
    ChecksumMismatch(String),

    #[error("index has no file entry segment")]
    MissingFileSegment,

    #[error("segment {0} is frozen and cannot be mutated")]
    FrozenSegment(usize),

    #[error("unknown index kind: {0}")]
    UnknownKind(String),

    #[error("shard {0} cannot be encoded in a raw offset")]
    InvalidShard(u8),

    #[error("data offset {0:#x} cannot be encoded in a raw offset")]
    InvalidDataOffset(u64),
}
