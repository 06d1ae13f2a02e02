use std::{fs, path::Path};

use alloy_primitives::{B256, U256};
use anyhow::{anyhow, bail, ensure};
use ethereum_hashing::hash32_concat;
use portal_api::{EpochAccumulator, Header, PreMergeAccumulatorProof};
use serde::{Deserialize, Serialize};
use ssz::Decode;
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, VariableList};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

use crate::{
    constants::{EPOCH_SIZE, EPOCH_TREE_DEPTH, MERGE_BLOCK_NUMBER},
    merkle::MerkleTree,
};

/// SSZ List[Hash256, max_length = MAX_HISTORICAL_EPOCHS]
/// List of historical epoch accumulator merkle roots preceding current epoch.
pub type HistoricalEpochRoots = VariableList<B256, typenum::U131072>;

/// Epoch holding block `block_number`.
pub fn get_epoch_index(block_number: u64) -> u64 {
    block_number / EPOCH_SIZE
}

/// Position of block `block_number` inside its epoch.
pub fn get_header_record_index(block_number: u64) -> u64 {
    block_number % EPOCH_SIZE
}

/// Commitment to the whole pre-merge chain: the root of every epoch, in order.
///
/// Built once from chain data and shipped to nodes as an SSZ artifact; read-only afterwards.
#[derive(
    Clone, Debug, Default, Decode, Encode, Eq, PartialEq, Deserialize, Serialize, TreeHash,
)]
pub struct PreMergeAccumulator {
    pub historical_epochs: HistoricalEpochRoots,
}

impl PreMergeAccumulator {
    /// Loads an SSZ encoded accumulator from disk.
    pub fn try_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read(path)
            .map_err(|err| anyhow!("Unable to read pre-merge accumulator at {path:?}: {err}"))?;
        Self::from_ssz_bytes(&raw)
            .map_err(|err| anyhow!("Unable to decode pre-merge accumulator: {err:?}"))
    }

    /// Loads an accumulator from disk and checks that it hashes to `expected_root`.
    pub fn try_from_file_with_root(path: &Path, expected_root: B256) -> anyhow::Result<Self> {
        let accumulator = Self::try_from_file(path)?;
        accumulator.verify_root(expected_root)?;
        Ok(accumulator)
    }

    pub fn verify_root(&self, expected_root: B256) -> anyhow::Result<()> {
        let root = self.tree_hash_root();
        ensure!(
            root == expected_root,
            "Pre-merge accumulator root mismatch. Found: {root} - Expected: {expected_root}"
        );
        Ok(())
    }

    /// Number of the last block to be included in the accumulator
    pub fn height(&self) -> u64 {
        MERGE_BLOCK_NUMBER
    }

    /// Root of the epoch holding block `block_number`, if that epoch is committed.
    pub fn epoch_root(&self, block_number: u64) -> Option<B256> {
        let epoch_index = usize::try_from(get_epoch_index(block_number)).ok()?;
        self.historical_epochs.get(epoch_index).copied()
    }

    pub fn contains_epoch_root(&self, epoch_root: &B256) -> bool {
        self.historical_epochs.contains(epoch_root)
    }

    /// Builds the 15 hash proof that `header` is part of `epoch_acc`.
    ///
    /// The epoch tree has one leaf per header record, `hash(block_hash, total_difficulty)`, at
    /// depth 13. The proof starts from the block hash, so the total difficulty is the first
    /// sibling, and ends with the list length mixed into the epoch root.
    pub fn construct_proof(
        header: &Header,
        epoch_acc: &EpochAccumulator,
    ) -> anyhow::Result<PreMergeAccumulatorProof> {
        if header.number > MERGE_BLOCK_NUMBER {
            bail!("Unable to construct proof for post-merge header.");
        }
        let hr_index = get_header_record_index(header.number) as usize;
        let header_record = epoch_acc.get(hr_index).ok_or_else(|| {
            anyhow!(
                "Epoch accumulator has {} records, no record for block {}",
                epoch_acc.len(),
                header.number
            )
        })?;
        let header_hash = header.hash();
        ensure!(
            header_record.block_hash == header_hash,
            "Block hash doesn't match historical header hash found in epoch acc. Found: {} - Expected: {header_hash}",
            header_record.block_hash
        );

        let leaves = epoch_acc
            .iter()
            .map(|record| {
                B256::from(hash32_concat(
                    record.block_hash.as_slice(),
                    &record.total_difficulty.to_le_bytes::<32>(),
                ))
            })
            .collect::<Vec<B256>>();
        let merkle_tree = MerkleTree::create(&leaves, EPOCH_TREE_DEPTH)
            .map_err(|err| anyhow!("Unable to build epoch tree: {err}"))?;
        let (leaf, mut proof) = merkle_tree
            .generate_proof(hr_index, EPOCH_TREE_DEPTH)
            .map_err(|err| anyhow!("Unable to generate proof for given index: {err}"))?;

        let header_difficulty = B256::from(header_record.total_difficulty.to_le_bytes::<32>());
        let record_hash = B256::from(hash32_concat(
            header_hash.as_slice(),
            header_difficulty.as_slice(),
        ));
        ensure!(
            leaf == record_hash,
            "Epoch tree leaf doesn't match header record"
        );

        proof.insert(0, header_difficulty);
        proof.push(B256::from(U256::from(epoch_acc.len()).to_le_bytes::<32>()));

        let proof: [B256; 15] = proof
            .try_into()
            .map_err(|proof: Vec<B256>| anyhow!("Invalid proof length: {}", proof.len()))?;
        Ok(proof.into())
    }
}
