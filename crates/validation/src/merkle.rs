//! A binary merkle tree over 32 byte leaves, with sha256 as the node hash and zero chunks as
//! padding, matching SSZ merkleization.

use alloy_primitives::B256;
use ethereum_hashing::hash32_concat;
use lazy_static::lazy_static;
use thiserror::Error;

/// Deepest tree supported. Trees here are at most 15 levels deep.
const MAX_TREE_DEPTH: usize = 32;

lazy_static! {
    /// Root of an all-zero tree of a given depth.
    static ref ZERO_HASHES: Vec<B256> = {
        let mut hashes = vec![B256::ZERO; MAX_TREE_DEPTH + 1];
        for depth in 0..MAX_TREE_DEPTH {
            hashes[depth + 1] =
                B256::from(hash32_concat(hashes[depth].as_slice(), hashes[depth].as_slice()));
        }
        hashes
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MerkleTreeError {
    #[error("{leaves} leaves do not fit in a tree of depth {depth}")]
    DepthTooSmall { leaves: usize, depth: usize },

    #[error("Tree depth {0} exceeds the supported maximum")]
    DepthTooLarge(usize),

    #[error("No leaf at index {index} for a tree of depth {depth}")]
    LeafNotFound { index: usize, depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleTree {
    Leaf(B256),
    Node(B256, Box<MerkleTree>, Box<MerkleTree>),
    /// A subtree of the given depth with only zero leaves.
    Zero(usize),
}

impl MerkleTree {
    /// Builds a tree of `depth` levels with `leaves` on the left and zero padding on the right.
    pub fn create(leaves: &[B256], depth: usize) -> Result<Self, MerkleTreeError> {
        if depth > MAX_TREE_DEPTH {
            return Err(MerkleTreeError::DepthTooLarge(depth));
        }
        if leaves.len() > 1 << depth {
            return Err(MerkleTreeError::DepthTooSmall {
                leaves: leaves.len(),
                depth,
            });
        }
        Ok(Self::create_unchecked(leaves, depth))
    }

    fn create_unchecked(leaves: &[B256], depth: usize) -> Self {
        if leaves.is_empty() {
            return Self::Zero(depth);
        }
        if depth == 0 {
            return Self::Leaf(leaves[0]);
        }
        let subtree_capacity = 1 << (depth - 1);
        let (left_leaves, right_leaves) = leaves.split_at(leaves.len().min(subtree_capacity));
        let left = Self::create_unchecked(left_leaves, depth - 1);
        let right = Self::create_unchecked(right_leaves, depth - 1);
        let hash = B256::from(hash32_concat(left.hash().as_slice(), right.hash().as_slice()));
        Self::Node(hash, Box::new(left), Box::new(right))
    }

    pub fn hash(&self) -> B256 {
        match self {
            Self::Leaf(hash) | Self::Node(hash, _, _) => *hash,
            Self::Zero(depth) => ZERO_HASHES[*depth],
        }
    }

    /// Returns the leaf at `index` and its sibling hashes, ordered from the leaf level upwards.
    pub fn generate_proof(
        &self,
        index: usize,
        depth: usize,
    ) -> Result<(B256, Vec<B256>), MerkleTreeError> {
        let not_found = MerkleTreeError::LeafNotFound { index, depth };
        if depth > MAX_TREE_DEPTH || index >= 1 << depth {
            return Err(not_found);
        }
        let mut proof = Vec::with_capacity(depth);
        let mut current = self;
        for level in (0..depth).rev() {
            let Self::Node(_, left, right) = current else {
                return Err(not_found);
            };
            if (index >> level) & 1 == 1 {
                proof.push(left.hash());
                current = right;
            } else {
                proof.push(right.hash());
                current = left;
            }
        }
        let Self::Leaf(leaf) = current else {
            return Err(not_found);
        };
        proof.reverse();
        Ok((*leaf, proof))
    }
}

/// Checks that `leaf` sits at `index` under `root`, given the sibling `branch` of length `depth`.
///
/// Bit `i` of `index` tells whether the node at level `i` is a right child. Bits at and above
/// `depth` are ignored, so a generalized index can be passed directly.
pub fn verify_merkle_proof(
    leaf: B256,
    branch: &[B256],
    depth: usize,
    index: usize,
    root: B256,
) -> bool {
    if branch.len() != depth {
        return false;
    }
    merkle_root_from_branch(leaf, branch, index) == root
}

fn merkle_root_from_branch(leaf: B256, branch: &[B256], index: usize) -> B256 {
    branch
        .iter()
        .enumerate()
        .fold(leaf, |node, (level, sibling)| {
            let hash = if (index >> level) & 1 == 1 {
                hash32_concat(sibling.as_slice(), node.as_slice())
            } else {
                hash32_concat(node.as_slice(), sibling.as_slice())
            };
            B256::from(hash)
        })
}
