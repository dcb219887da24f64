use serde::{Deserialize, Serialize};

use crate::crypto::keccak256;
use crate::errors::{LedgerError, LedgerResult};

/// Binary Merkle tree over the transactions of one block, leaves in
/// delivery order. All levels are retained so inclusion proofs can be
/// produced for historical queries.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Build a tree over leaf hashes in the order given, or `None` when
    /// there are no leaves. A level with an odd node count duplicates its
    /// last node to pair with itself; a single leaf pairs with itself the
    /// same way.
    pub fn build(leaves: Vec<[u8; 32]>) -> Option<MerkleTree> {
        if leaves.is_empty() {
            return None;
        }
        let mut levels = vec![leaves];
        loop {
            let current = levels.last()?;
            if levels.len() > 1 && current.len() == 1 {
                break;
            }
            let mut next = Vec::with_capacity((current.len() + 1) / 2);
            for chunk in current.chunks(2) {
                let left = chunk[0];
                let right = if chunk.len() == 2 { chunk[1] } else { chunk[0] };
                next.push(hash_children(&left, &right));
            }
            levels.push(next);
        }
        Some(MerkleTree { levels })
    }

    pub fn root(&self) -> [u8; 32] {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or_default()
    }

    /// Index of the first leaf matching `leaf`, in delivery order.
    pub fn leaf_index(&self, leaf: &[u8; 32]) -> Option<usize> {
        self.levels
            .first()
            .and_then(|leaves| leaves.iter().position(|candidate| candidate == leaf))
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        let mut positions = Vec::with_capacity(self.levels.len() - 1);
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            // the duplicated last node of an odd level is its own sibling
            let sibling = level.get(sibling_idx).unwrap_or(&level[idx]);
            siblings.push(format!("0x{}", hex::encode(sibling)));
            positions.push(if idx % 2 == 0 { 1 } else { 0 });
            idx /= 2;
        }
        Some(MerkleProof {
            siblings,
            positions,
        })
    }

    /// Inclusion proof for the first leaf equal to `leaf`.
    pub fn proof_for_leaf(&self, leaf: &[u8; 32]) -> Option<MerkleProof> {
        self.proof(self.leaf_index(leaf)?)
    }
}

fn hash_children(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(left);
    data.extend_from_slice(right);
    keccak256(&data)
}

/// Inclusion proof for one leaf: sibling hashes from the leaf level up to
/// the level below the root, each tagged with its side (0 when the sibling
/// sits left of the running hash, 1 when it sits right).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub siblings: Vec<String>,
    pub positions: Vec<u8>,
}

impl MerkleProof {
    /// Recompute the root implied by `leaf` under this proof.
    pub fn compute_root(&self, leaf: [u8; 32]) -> LedgerResult<[u8; 32]> {
        if self.siblings.len() != self.positions.len() {
            return Err(LedgerError::InvalidProof(format!(
                "{} siblings with {} positions",
                self.siblings.len(),
                self.positions.len()
            )));
        }
        let mut value = leaf;
        for (sibling_hex, position) in self.siblings.iter().zip(&self.positions) {
            let sibling = decode_node(sibling_hex)?;
            value = match position {
                0 => hash_children(&sibling, &value),
                1 => hash_children(&value, &sibling),
                other => {
                    return Err(LedgerError::InvalidProof(format!(
                        "position tag {other} is not 0 or 1"
                    )))
                }
            };
        }
        Ok(value)
    }
}

fn decode_node(value: &str) -> LedgerResult<[u8; 32]> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped)
        .map_err(|err| LedgerError::InvalidProof(format!("invalid sibling encoding: {err}")))?;
    if bytes.len() != 32 {
        return Err(LedgerError::InvalidProof(
            "sibling must encode exactly 32 bytes".to_string(),
        ));
    }
    let mut node = [0u8; 32];
    node.copy_from_slice(&bytes);
    Ok(node)
}
