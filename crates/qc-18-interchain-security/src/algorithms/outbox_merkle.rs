//! # Outbox Merkle Arithmetic
//!
//! The root computation the native bridge outbox performs before it
//! executes an origin-rollup call. The ISM never runs this itself on the
//! verification path; the bridge is the authority. It is used by the
//! in-memory outbox adapter and by tooling that builds proofs.

use crate::domain::{keccak256, CanonicalAddress, Hash};
use primitive_types::U256;

/// Deepest proof the outbox accepts.
pub const MAX_PROOF_DEPTH: usize = 255;

/// Fields the outbox commits to for one origin-rollup call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboxCall<'a> {
    /// Origin-rollup caller.
    pub sender: &'a CanonicalAddress,
    /// Destination target.
    pub target: &'a CanonicalAddress,
    /// Origin block number.
    pub origin_block: U256,
    /// Destination block number.
    pub destination_block: U256,
    /// Origin timestamp.
    pub origin_timestamp: U256,
    /// Native value carried by the call.
    pub value: U256,
    /// Calldata.
    pub data: &'a [u8],
}

/// `keccak256(abi.encodePacked(sender, target, originBlock, destBlock, ts, value, data))`.
///
/// Addresses are packed as 20 bytes.
pub fn call_item_hash(call: &OutboxCall<'_>) -> Hash {
    let mut packed = Vec::with_capacity(20 + 20 + 4 * 32 + call.data.len());
    packed.extend_from_slice(&call.sender.as_bytes()[12..]);
    packed.extend_from_slice(&call.target.as_bytes()[12..]);
    for word in [
        call.origin_block,
        call.destination_block,
        call.origin_timestamp,
        call.value,
    ] {
        let mut buf = [0u8; 32];
        word.to_big_endian(&mut buf);
        packed.extend_from_slice(&buf);
    }
    packed.extend_from_slice(call.data);
    keccak256(&packed)
}

/// Leaf committed in the outbox tree for an item hash.
pub fn leaf_hash(item: &Hash) -> Hash {
    keccak256(item)
}

/// Fold a branch from `leaf` upwards; bit `i` of `path` set means the
/// node at level `i` is the right child.
pub fn calculate_root(proof: &[Hash], path: u64, leaf: Hash) -> Hash {
    let mut node = leaf;
    let mut path = path;
    for sibling in proof {
        let mut pair = [0u8; 64];
        if path & 1 == 0 {
            pair[..32].copy_from_slice(&node);
            pair[32..].copy_from_slice(sibling);
        } else {
            pair[..32].copy_from_slice(sibling);
            pair[32..].copy_from_slice(&node);
        }
        node = keccak256(&pair);
        path >>= 1;
    }
    node
}

/// Build a complete tree over `leaves` (padded with zero hashes to a power
/// of two). Returns the root and one branch per original leaf.
pub fn build_tree(leaves: &[Hash]) -> (Hash, Vec<Vec<Hash>>) {
    if leaves.is_empty() {
        return ([0u8; 32], Vec::new());
    }

    let width = leaves.len().next_power_of_two();
    let mut level: Vec<Hash> = leaves.to_vec();
    level.resize(width, [0u8; 32]);

    let mut branches: Vec<Vec<Hash>> = vec![Vec::new(); leaves.len()];
    while level.len() > 1 {
        for (i, branch) in branches.iter_mut().enumerate() {
            let pos = i >> branch.len();
            branch.push(level[pos ^ 1]);
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&pair[0]);
                buf[32..].copy_from_slice(&pair[1]);
                keccak256(&buf)
            })
            .collect();
    }

    (level[0], branches)
}
