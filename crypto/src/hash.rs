//! Blake2b hashing for transaction proposals.

use accord_types::TxHash;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a canonically serialized transaction proposal to produce its `TxHash`.
///
/// Every required signer signs exactly this value, so the input bytes must be
/// the deterministic (bincode) encoding of the proposal body.
pub fn hash_transaction(proposal_bytes: &[u8]) -> TxHash {
    TxHash::new(blake2b_256(proposal_bytes))
}
