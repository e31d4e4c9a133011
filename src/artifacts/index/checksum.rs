//! SHA-1 integrity blocks
//!
//! Segments carry the SHA-1 of their entry bytes in their header record. The
//! header and the segment header block each reserve a 64-byte slot at their
//! tail whose first 20 bytes hold the SHA-1 of everything before the slot.

use crate::artifacts::index::error::IndexError;
use crate::artifacts::index::{CHECKSUM_SIZE, HASH_SLOT_SIZE};
use sha1::{Digest, Sha1};

pub type Sha1Hash = [u8; CHECKSUM_SIZE];

pub fn sha1(data: &[u8]) -> Sha1Hash {
    let mut hasher = Sha1::new();
    hasher.update(data);

    let mut hash = [0u8; CHECKSUM_SIZE];
    hash.copy_from_slice(hasher.finalize().as_slice());
    hash
}

/// Hash `block` minus its trailing slot and store the result in the slot
pub fn seal(block: &mut [u8]) -> Result<Sha1Hash, IndexError> {
    let slot = slot_start(block)?;
    let hash = sha1(&block[..slot]);
    block[slot..slot + CHECKSUM_SIZE].copy_from_slice(&hash);

    Ok(hash)
}

/// Check that the trailing slot of `block` holds the hash of the rest
pub fn verify_sealed(block: &[u8]) -> Result<bool, IndexError> {
    let slot = slot_start(block)?;
    let hash = sha1(&block[..slot]);

    Ok(block[slot..slot + CHECKSUM_SIZE] == hash)
}

fn slot_start(block: &[u8]) -> Result<usize, IndexError> {
    block
        .len()
        .checked_sub(HASH_SLOT_SIZE)
        .ok_or(IndexError::HeaderTooSmall(block.len()))
}
